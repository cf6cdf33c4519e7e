//! Client credentials and redirect settings supplied by the integrating application.

// self
use crate::_prelude::*;

/// Per-application OAuth client configuration shared by every provider.
///
/// The value is immutable once a flow is built. It deserializes from JSON/TOML so it can
/// live next to the rest of an application's settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: String,
	/// Scopes requested in addition to the provider defaults, in order.
	#[serde(default)]
	pub scope: Vec<String>,
	/// Redirect URI registered with the provider.
	pub redirect_uri: String,
}
impl ProviderConfig {
	/// Creates a configuration without extra scopes.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		redirect_uri: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			scope: Vec::new(),
			redirect_uri: redirect_uri.into(),
		}
	}

	/// Replaces the requested scopes.
	pub fn with_scope<I, S>(mut self, scope: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scope = scope.into_iter().map(Into::into).collect();

		self
	}
}
impl Debug for ProviderConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.field("scope", &self.scope)
			.field("redirect_uri", &self.redirect_uri)
			.finish()
	}
}
