// self
use crate::obs::{FlowOutcome, FlowStage};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(stage: FlowStage, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_integration_flow_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}

/// Records success or failure for `result` and hands it back untouched.
pub(crate) fn record_result<T, E>(stage: FlowStage, result: Result<T, E>) -> Result<T, E> {
	record_flow_outcome(
		stage,
		if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure },
	);

	result
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_flow_outcome_noop_without_metrics() {
		record_flow_outcome(FlowStage::Exchange, FlowOutcome::Failure);
	}

	#[test]
	fn record_result_passes_values_through() {
		assert_eq!(record_result::<_, ()>(FlowStage::Link, Ok(7)), Ok(7));
		assert_eq!(record_result::<(), _>(FlowStage::Link, Err("boom")), Err("boom"));
	}
}
