//! Outbound leg: `state` issuance and authorize URL construction.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::ScopeList,
	error::ConfigError,
	flows::ProviderFlow,
	http::ProviderHttpClient,
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	oauth::TransportErrorMapper,
};

const STATE_LEN: usize = 43;

/// Authorize URL plus the `state` embedded in it.
///
/// Persist `state` (session, signed cookie) and compare it with the value the provider
/// sends back before calling
/// [`validate_callback`](crate::flows::OAuthProvider::validate_callback).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRequest {
	/// URL the end-user should be redirected to.
	pub url: Url,
	/// Single-use anti-forgery token carried in `url`.
	pub state: String,
}

impl<C, M, P> ProviderFlow<C, M, P>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Issues a fresh `state` and builds the provider authorize URL around it.
	///
	/// Parameters appear as `client_id`, `response_type`, `redirect_uri`, `scope` (omitted
	/// when no scopes are configured), `state`, then [`Self::authorize_params`].
	pub fn authorization_url(&self, redirect_uri: Option<&str>) -> Result<AuthorizationRequest> {
		let _guard = FlowSpan::new(&self.descriptor.id, FlowStage::Authorize).entered();

		obs::record_flow_outcome(FlowStage::Authorize, FlowOutcome::Attempt);

		obs::record_result(FlowStage::Authorize, self.build_authorization_request(redirect_uri))
	}

	fn build_authorization_request(
		&self,
		redirect_uri: Option<&str>,
	) -> Result<AuthorizationRequest> {
		let quirks = &self.descriptor.quirks;
		let scope = ScopeList::new(quirks.default_scopes.iter().chain(&self.config.scope).cloned())
			.map_err(ConfigError::from)?
			.join(quirks.scope_delimiter);
		let state = generate_state();
		let mut params = vec![
			("client_id", Some(self.config.client_id.as_str())),
			("response_type", Some("code")),
			("redirect_uri", Some(redirect_uri.unwrap_or(&self.config.redirect_uri))),
			("scope", scope.as_deref()),
			("state", Some(state.as_str())),
		];

		params.extend(self.authorize_params.iter().map(|(k, v)| (k.as_str(), Some(v.as_str()))));

		let url = build_url(self.descriptor.endpoints.authorization.as_str(), &params)?;

		Ok(AuthorizationRequest { url, state })
	}
}

/// Generates an unguessable URL-safe `state` value.
///
/// 43 alphanumeric characters drawn from the thread-local CSPRNG, roughly 256 bits.
pub fn generate_state() -> String {
	rand::rng().sample_iter(&Alphanumeric).take(STATE_LEN).map(char::from).collect()
}

/// Appends percent-encoded parameters to `base` in the given order.
///
/// `None` values are skipped. Keys and values keep only RFC 3986 unreserved characters
/// literal, so spaces become `%20`. An existing query on `base` is kept in front.
pub fn build_url(base: &str, params: &[(&str, Option<&str>)]) -> Result<Url> {
	let mut url = Url::parse(base)
		.map_err(|source| ConfigError::InvalidUrl { url: base.to_owned(), source })?;
	let encoded = params
		.iter()
		.filter_map(|(key, value)| {
			value.map(|value| {
				format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
			})
		})
		.collect::<Vec<_>>()
		.join("&");

	if encoded.is_empty() {
		return Ok(url);
	}

	let query = match url.query() {
		Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
		_ => encoded,
	};

	url.set_query(Some(&query));

	Ok(url)
}
