//! Token sets produced by a successful authorization-code exchange.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret, error::RequestError};

/// Tokens issued by a provider for one successful exchange.
///
/// The set is immutable and handed to the caller as-is; nothing in this crate caches or
/// logs it, and the secret fields redact themselves in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
	/// Access token presented as a bearer credential.
	pub access_token: TokenSecret,
	/// Token type reported by the provider (usually `bearer`, casing varies).
	pub token_type: String,
	/// Granted scopes as reported by the provider, space-delimited.
	pub scope: Option<String>,
	/// Access token lifetime in seconds, when the provider reports one.
	pub access_token_expires_in: Option<u64>,
	/// Refresh token, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
}
impl TokenSet {
	/// Returns true when the provider reported a bearer token, ignoring case.
	pub fn is_bearer(&self) -> bool {
		self.token_type.eq_ignore_ascii_case("bearer")
	}

	/// Computes the absolute expiry for a set received at `received_at`.
	pub fn expires_at(&self, received_at: OffsetDateTime) -> Option<OffsetDateTime> {
		let secs = i64::try_from(self.access_token_expires_in?).ok()?;

		received_at.checked_add(Duration::seconds(secs))
	}
}
impl Debug for TokenSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSet")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("access_token_expires_in", &self.access_token_expires_in)
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.finish()
	}
}

/// Token endpoint response body (RFC 6749 section 5.1).
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
	access_token: String,
	token_type: String,
	#[serde(default)]
	scope: Option<RawScope>,
	#[serde(default)]
	expires_in: Option<u64>,
	#[serde(default)]
	refresh_token: Option<String>,
}
impl TokenResponse {
	/// Converts the wire body received with `status` into a [`TokenSet`].
	///
	/// The access token must be usable as a bearer credential (RFC 6750 `b64token`
	/// characters are a subset of visible ASCII).
	pub(crate) fn into_token_set(self, status: u16) -> Result<TokenSet, RequestError> {
		if self.access_token.is_empty() || !self.access_token.bytes().all(|b| b.is_ascii_graphic())
		{
			return Err(RequestError::MalformedResponse {
				status,
				detail: "access_token is not a valid bearer credential".into(),
				source: None,
			});
		}

		Ok(TokenSet {
			access_token: TokenSecret::new(self.access_token),
			token_type: self.token_type,
			scope: self.scope.map(RawScope::into_text),
			access_token_expires_in: self.expires_in,
			refresh_token: self.refresh_token.map(TokenSecret::new),
		})
	}
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScope {
	Text(String),
	List(Vec<String>),
}
impl RawScope {
	fn into_text(self) -> String {
		match self {
			RawScope::Text(text) => text,
			RawScope::List(list) => list.join(" "),
		}
	}
}
