//! Callback leg: code exchange, profile fetch, and account linking.

// crates.io
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{ProviderUserId, TokenResponse, TokenSecret, TokenSet},
	error::RequestError,
	flows::ProviderFlow,
	http::{Endpoint, ProviderHttpClient},
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	oauth::{self, TransportErrorMapper},
	store::LinkedAccount,
};

/// External identity returned by the provider's user-info endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUser<P = Value> {
	/// Stable provider-side identifier, read from the descriptor's `user_id_field`.
	pub id: ProviderUserId,
	/// Profile payload as decoded from the provider.
	pub profile: P,
}

/// Everything a successful callback produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackOutcome<P = Value> {
	/// Account record returned by the store, unmodified.
	pub account: LinkedAccount,
	/// Provider profile used for linking.
	pub provider_user: ProviderUser<P>,
	/// Tokens issued by the exchange; ownership moves to the caller.
	pub tokens: TokenSet,
}

impl<C, M, P> ProviderFlow<C, M, P>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
	P: DeserializeOwned,
{
	/// Runs exchange, profile fetch, then link, stopping at the first failure.
	///
	/// The account store is only reached once both provider calls succeeded.
	pub async fn validate_callback(&self, code: &str) -> Result<CallbackOutcome<P>> {
		let span = FlowSpan::new(&self.descriptor.id, FlowStage::Callback);

		obs::record_flow_outcome(FlowStage::Callback, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let tokens = self.exchange(code).await?;
				let provider_user = self.fetch_user(&tokens.access_token).await?;
				let account = self.link(&provider_user.id).await?;

				Ok(CallbackOutcome { account, provider_user, tokens })
			})
			.await;

		obs::record_result(FlowStage::Callback, result)
	}

	/// Trades an authorization code for a [`TokenSet`].
	///
	/// The configured redirect URI is sent. Failures, including an access token that cannot
	/// travel as a bearer header, surface as [`Error::TokenExchangeFailed`] and are never
	/// retried.
	pub async fn exchange(&self, code: &str) -> Result<TokenSet> {
		let span = FlowSpan::new(&self.descriptor.id, FlowStage::Exchange);

		obs::record_flow_outcome(FlowStage::Exchange, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = oauth::token_request(&self.descriptor, &self.config, code)?;
				let response = self
					.executor
					.send(Endpoint::Token, request)
					.await
					.map_err(|cause| Error::TokenExchangeFailed { cause })?;
				let status = response.status().as_u16();

				oauth::decode_body::<TokenResponse>(status, response.body())
					.and_then(|body| body.into_token_set(status))
					.map_err(|cause| Error::TokenExchangeFailed { cause })
			})
			.await;

		obs::record_result(FlowStage::Exchange, result)
	}

	/// Fetches the provider profile with a bearer token.
	///
	/// Failures, including a profile without a usable identifier, surface as
	/// [`Error::ProfileFetchFailed`].
	pub async fn fetch_user(&self, access_token: &TokenSecret) -> Result<ProviderUser<P>> {
		let span = FlowSpan::new(&self.descriptor.id, FlowStage::Profile);

		obs::record_flow_outcome(FlowStage::Profile, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let request = oauth::user_info_request(&self.descriptor, access_token.expose())?;
				let response = self
					.executor
					.send(Endpoint::UserInfo, request)
					.await
					.map_err(|cause| Error::ProfileFetchFailed { cause })?;

				decode_provider_user(
					response.status().as_u16(),
					response.body(),
					&self.descriptor.quirks.user_id_field,
				)
				.map_err(|cause| Error::ProfileFetchFailed { cause })
			})
			.await;

		obs::record_result(FlowStage::Profile, result)
	}

	/// Binds the external identity to a local account through the store.
	///
	/// Whatever the store reports is surfaced as [`Error::LinkFailed`].
	pub async fn link(&self, provider_user_id: &ProviderUserId) -> Result<LinkedAccount> {
		let span = FlowSpan::new(&self.descriptor.id, FlowStage::Link);

		obs::record_flow_outcome(FlowStage::Link, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				self.store
					.connect(&self.descriptor.id, provider_user_id)
					.await
					.map_err(|cause| Error::LinkFailed { cause })
			})
			.await;

		obs::record_result(FlowStage::Link, result)
	}
}

/// Decodes a profile body, pulling the identifier out of `id_field` first.
fn decode_provider_user<P>(
	status: u16,
	body: &[u8],
	id_field: &str,
) -> Result<ProviderUser<P>, RequestError>
where
	P: DeserializeOwned,
{
	let raw = oauth::decode_body::<Value>(status, body)?;
	let id = provider_user_id(status, &raw, id_field)?;
	let profile = oauth::decode_value(status, raw)?;

	Ok(ProviderUser { id, profile })
}

/// Reads the identifier at `field`; a leading `/` selects a JSON pointer.
fn provider_user_id(
	status: u16,
	profile: &Value,
	field: &str,
) -> Result<ProviderUserId, RequestError> {
	let malformed =
		|detail: String| RequestError::MalformedResponse { status, detail, source: None };
	let value = if field.starts_with('/') { profile.pointer(field) } else { profile.get(field) };
	let raw = match value {
		Some(Value::String(id)) => id.clone(),
		Some(Value::Number(id)) if id.is_i64() || id.is_u64() => id.to_string(),
		Some(_) =>
			return Err(malformed(format!("user id field `{field}` is not a string or integer"))),
		None => return Err(malformed(format!("profile is missing the user id field `{field}`"))),
	};

	ProviderUserId::new(&raw)
		.map_err(|e| malformed(format!("user id field `{field}` is invalid: {e}")))
}
