//! Spotify accounts integration.
//!
//! Spotify authenticates the token request with HTTP Basic credentials and returns the
//! current-user object from `/v1/me`, keyed by a string `id`.

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

/// Identifier recorded on accounts linked through Spotify.
pub const PROVIDER_ID: &str = "spotify";

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.spotify.com/authorize";
const TOKEN_ENDPOINT: &str = "https://accounts.spotify.com/api/token";
const USER_INFO_ENDPOINT: &str = "https://api.spotify.com/v1/me";

/// Client configuration plus Spotify-specific authorize flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyConfig {
	/// Shared client credentials, scopes, and redirect URI.
	#[serde(flatten)]
	pub client: ProviderConfig,
	/// Forces the consent dialog even when the user already approved the app.
	#[serde(default)]
	pub show_dialog: bool,
}
impl SpotifyConfig {
	/// Wraps shared client settings with `show_dialog` disabled.
	pub fn new(client: ProviderConfig) -> Self {
		Self { client, show_dialog: false }
	}

	/// Overrides `show_dialog`.
	pub fn with_show_dialog(mut self, show_dialog: bool) -> Self {
		self.show_dialog = show_dialog;

		self
	}
}

/// Current-user object returned by `GET /v1/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyUser {
	/// ISO 3166-1 alpha-2 country code; needs `user-read-private`.
	pub country: Option<String>,
	/// Name shown on the profile, if set.
	pub display_name: Option<String>,
	/// Account email; needs `user-read-email`.
	pub email: Option<String>,
	/// Explicit content settings; needs `user-read-private`.
	#[serde(default)]
	pub explicit_content: SpotifyExplicitContent,
	/// Known external URLs for the user.
	pub external_urls: SpotifyExternalUrls,
	/// Follower information.
	pub followers: SpotifyFollowers,
	/// Web API endpoint for this user.
	pub href: String,
	/// Spotify user id.
	pub id: String,
	/// Profile images, widest first.
	#[serde(default)]
	pub images: Vec<SpotifyImage>,
	/// Subscription level (`premium`, `free`, ...); needs `user-read-private`.
	pub product: Option<String>,
	/// Object type, always `user`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Spotify URI for the user.
	pub uri: String,
}

/// Explicit content filter flags.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyExplicitContent {
	pub filter_enabled: Option<bool>,
	pub filter_locked: Option<bool>,
}

/// External URLs attached to a Spotify object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyExternalUrls {
	/// Open Spotify URL.
	pub spotify: String,
}

/// Follower summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyFollowers {
	/// Always `null` in current API versions.
	pub href: Option<String>,
	/// Follower count.
	pub total: u64,
}

/// Image attached to a profile.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyImage {
	pub url: String,
	pub height: Option<u32>,
	pub width: Option<u32>,
}

/// Builds the Spotify descriptor.
pub fn descriptor() -> Result<ProviderDescriptor> {
	let id = ProviderId::new(PROVIDER_ID).map_err(ConfigError::from)?;
	let descriptor = ProviderDescriptor::builder(id)
		.authorization_endpoint(provider::endpoint(AUTHORIZATION_ENDPOINT)?)
		.token_endpoint(provider::endpoint(TOKEN_ENDPOINT)?)
		.user_info_endpoint(provider::endpoint(USER_INFO_ENDPOINT)?)
		.client_auth_method(ClientAuthMethod::ClientSecretBasic)
		.build()
		.map_err(ConfigError::from)?;

	Ok(descriptor)
}

/// Builds a Spotify flow on a caller-provided descriptor and transport.
///
/// `show_dialog` is always sent, as `true` or `false`.
pub fn spotify_flow<C, M>(
	store: Arc<dyn AccountStore>,
	descriptor: ProviderDescriptor,
	config: SpotifyConfig,
	http_client: impl Into<Arc<C>>,
	mapper: impl Into<Arc<M>>,
) -> ProviderFlow<C, M, SpotifyUser>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let show_dialog = config.show_dialog.to_string();

	ProviderFlow::with_http_client(store, descriptor, config.client, http_client, mapper)
		.with_authorize_param("show_dialog", show_dialog)
		.with_profile::<SpotifyUser>()
}

/// Builds a Spotify flow backed by the default reqwest transport.
#[cfg(feature = "reqwest")]
pub fn spotify(
	store: Arc<dyn AccountStore>,
	config: SpotifyConfig,
) -> Result<ReqwestProviderFlow<SpotifyUser>> {
	Ok(spotify_flow(
		store,
		descriptor()?,
		config,
		ReqwestHttpClient::default(),
		ReqwestTransportErrorMapper,
	))
}
