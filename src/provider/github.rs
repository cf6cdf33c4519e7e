//! GitHub OAuth app integration.
//!
//! GitHub expects client credentials in the token request body, answers the token
//! endpoint in JSON only when asked to, and identifies users by an integer `id`.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::ConfigError,
	flows::ProviderFlow,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	provider::{self, ClientAuthMethod, ProviderConfig, ProviderDescriptor},
	store::AccountStore,
};
#[cfg(feature = "reqwest")]
use crate::{flows::ReqwestProviderFlow, http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Identifier recorded on accounts linked through GitHub.
pub const PROVIDER_ID: &str = "github";

const AUTHORIZATION_ENDPOINT: &str = "https://github.com/login/oauth/authorize";
const TOKEN_ENDPOINT: &str = "https://github.com/login/oauth/access_token";
const USER_INFO_ENDPOINT: &str = "https://api.github.com/user";

/// Client configuration plus GitHub-specific authorize flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubConfig {
	/// Shared client credentials, scopes, and redirect URI.
	#[serde(flatten)]
	pub client: ProviderConfig,
	/// Whether unauthenticated users may sign up during the flow; omitted when unset.
	#[serde(default)]
	pub allow_signup: Option<bool>,
}
impl GitHubConfig {
	/// Wraps shared client settings without extra flags.
	pub fn new(client: ProviderConfig) -> Self {
		Self { client, allow_signup: None }
	}

	/// Sets `allow_signup`.
	pub fn with_allow_signup(mut self, allow_signup: bool) -> Self {
		self.allow_signup = Some(allow_signup);

		self
	}
}

/// Authenticated user returned by `GET /user`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
	/// Login handle.
	pub login: String,
	/// Numeric user id.
	pub id: u64,
	/// GraphQL node id.
	pub node_id: String,
	/// Avatar image URL.
	pub avatar_url: String,
	/// Profile page URL.
	pub html_url: String,
	/// Display name.
	pub name: Option<String>,
	/// Public email, if the user exposes one.
	pub email: Option<String>,
	#[allow(missing_docs)]
	pub company: Option<String>,
	#[allow(missing_docs)]
	pub location: Option<String>,
	#[allow(missing_docs)]
	pub bio: Option<String>,
	/// Account type (`User` or `Organization`).
	#[serde(rename = "type")]
	pub kind: String,
}

/// Builds the GitHub descriptor.
pub fn descriptor() -> Result<ProviderDescriptor> {
	let id = ProviderId::new(PROVIDER_ID).map_err(ConfigError::from)?;
	let descriptor = ProviderDescriptor::builder(id)
		.authorization_endpoint(provider::endpoint(AUTHORIZATION_ENDPOINT)?)
		.token_endpoint(provider::endpoint(TOKEN_ENDPOINT)?)
		.user_info_endpoint(provider::endpoint(USER_INFO_ENDPOINT)?)
		.client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.map_err(ConfigError::from)?;

	Ok(descriptor)
}

/// Builds a GitHub flow on a caller-provided descriptor and transport.
pub fn github_flow<C, M>(
	store: Arc<dyn AccountStore>,
	descriptor: ProviderDescriptor,
	config: GitHubConfig,
	http_client: impl Into<Arc<C>>,
	mapper: impl Into<Arc<M>>,
) -> ProviderFlow<C, M, GitHubUser>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let flow = ProviderFlow::with_http_client(store, descriptor, config.client, http_client, mapper);
	let flow = match config.allow_signup {
		Some(allow_signup) => flow.with_authorize_param("allow_signup", allow_signup.to_string()),
		None => flow,
	};

	flow.with_profile::<GitHubUser>()
}

/// Builds a GitHub flow backed by the default reqwest transport.
#[cfg(feature = "reqwest")]
pub fn github(
	store: Arc<dyn AccountStore>,
	config: GitHubConfig,
) -> Result<ReqwestProviderFlow<GitHubUser>> {
	Ok(github_flow(
		store,
		descriptor()?,
		config,
		ReqwestHttpClient::default(),
		ReqwestTransportErrorMapper,
	))
}
