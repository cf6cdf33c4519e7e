#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_integration::{
	_preludet::*,
	auth::{ProviderId, ProviderUserId, TokenSecret, TokenSet},
	error::RequestError,
	flows::OAuthProvider,
	oauth::ReqwestTransportErrorMapper,
	provider::{
		ClientAuthMethod, ProviderConfig, ProviderDescriptor,
		github::{self, GitHubConfig},
		spotify::{self, SpotifyConfig},
	},
	store::{AccountStore, MemoryAccountStore},
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";
const REDIRECT_URI: &str = "https://app.example.com/callback";
// base64("client-it:secret-it")
const BASIC_AUTH: &str = "Basic Y2xpZW50LWl0OnNlY3JldC1pdA==";
const TOKEN_BODY: &str = "{\"access_token\":\"T\",\"token_type\":\"bearer\",\"scope\":\"s\",\"expires_in\":3600,\"refresh_token\":\"R\"}";
const EXCHANGE_FORM: &str =
	"code=code1&grant_type=authorization_code&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback";

fn build_descriptor(
	server: &MockServer,
	id: &str,
	method: ClientAuthMethod,
) -> ProviderDescriptor {
	let provider_id =
		ProviderId::new(id).expect("Provider identifier should be valid for callback test.");

	ProviderDescriptor::builder(provider_id)
		.authorization_endpoint(
			Url::parse(&server.url("/authorize"))
				.expect("Mock authorization endpoint should parse successfully."),
		)
		.token_endpoint(
			Url::parse(&server.url("/token"))
				.expect("Mock token endpoint should parse successfully."),
		)
		.user_info_endpoint(
			Url::parse(&server.url("/me")).expect("Mock profile endpoint should parse successfully."),
		)
		.client_auth_method(method)
		.build()
		.expect("Provider descriptor should build successfully.")
}

fn config() -> ProviderConfig {
	ProviderConfig::new(CLIENT_ID, CLIENT_SECRET, REDIRECT_URI)
}

fn provider_user_id(value: &str) -> ProviderUserId {
	ProviderUserId::new(value).expect("Provider user identifier fixture should be valid.")
}

#[tokio::test]
async fn validate_callback_returns_store_record_profile_and_tokens() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server, "mock-basic", ClientAuthMethod::ClientSecretBasic);
	let (flow, store) = build_reqwest_test_flow(descriptor, config());
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("authorization", BASIC_AUTH)
				.header("content-type", "application/x-www-form-urlencoded")
				.header("accept", "application/json")
				.body(EXCHANGE_FORM);
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me").header("authorization", "Bearer T");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":\"u1\",\"display_name\":\"Ada\"}");
		})
		.await;
	let outcome =
		flow.validate_callback("code1").await.expect("Callback validation should succeed.");

	token_mock.assert_calls_async(1).await;
	profile_mock.assert_calls_async(1).await;

	assert_eq!(outcome.tokens, TokenSet {
		access_token: TokenSecret::new("T"),
		token_type: "bearer".into(),
		scope: Some("s".into()),
		access_token_expires_in: Some(3600),
		refresh_token: Some(TokenSecret::new("R")),
	});
	assert_eq!(outcome.provider_user.id, provider_user_id("u1"));
	assert_eq!(outcome.provider_user.profile["display_name"], "Ada");
	assert!(outcome.account.created);
	assert_eq!(&*outcome.account.provider_id, "mock-basic");

	let stored = store
		.lookup(&outcome.account.provider_id, &outcome.provider_user.id)
		.await
		.expect("Store lookup should succeed.")
		.expect("Linked account should be persisted.");

	assert_eq!(stored.user_id, outcome.account.user_id);

	let again = OAuthProvider::validate_callback(&flow, "code1")
		.await
		.expect("A second callback for the same user should succeed.");

	assert!(!again.account.created);
	assert_eq!(again.account.user_id, outcome.account.user_id);
	assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn rejected_exchange_surfaces_status_and_body_without_later_steps() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server, "mock-reject", ClientAuthMethod::ClientSecretBasic);
	let (flow, store) = build_reqwest_test_flow(descriptor, config());
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me");
			then.status(200).body("{\"id\":\"u1\"}");
		})
		.await;
	let err =
		flow.validate_callback("stale").await.expect_err("HTTP 400 should fail the callback.");

	match err {
		Error::TokenExchangeFailed { cause: RequestError::Provider { status, body, .. } } => {
			assert_eq!(status, 400);
			assert_eq!(body, "{\"error\":\"invalid_grant\"}");
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	token_mock.assert_calls_async(1).await;
	profile_mock.assert_calls_async(0).await;

	assert!(store.is_empty(), "Store must stay untouched when the exchange fails.");
}

#[tokio::test]
async fn rejected_profile_fetch_skips_linking() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server, "mock-profile", ClientAuthMethod::ClientSecretBasic);
	let (flow, store) = build_reqwest_test_flow(descriptor, config());
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let _profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me");
			then.status(401)
				.header("retry-after", "7")
				.body("{\"error\":{\"status\":401,\"message\":\"Invalid access token\"}}");
		})
		.await;
	let err =
		flow.validate_callback("code1").await.expect_err("HTTP 401 should fail the callback.");

	match err.request_error() {
		Some(RequestError::Provider { status: 401, retry_after, .. }) => {
			assert!(matches!(err, Error::ProfileFetchFailed { .. }));
			assert_eq!(*retry_after, Some(Duration::seconds(7)));
		},
		other => panic!("Unexpected cause: {other:?}."),
	}

	assert!(store.is_empty());
}

#[tokio::test]
async fn malformed_token_bodies_are_classified() {
	let server = MockServer::start_async().await;
	let descriptor =
		build_descriptor(&server, "mock-malformed", ClientAuthMethod::ClientSecretBasic);
	let (flow, _) = build_reqwest_test_flow(descriptor, config());
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"error\":\"bad_verification_code\"}");
		})
		.await;
	let err = flow.exchange("code1").await.expect_err("Bodies without tokens should fail.");

	assert!(matches!(
		err,
		Error::TokenExchangeFailed { cause: RequestError::MalformedResponse { status: 200, .. } }
	));
}

#[tokio::test]
async fn access_tokens_unfit_for_a_header_fail_the_exchange() {
	let server = MockServer::start_async().await;
	let descriptor = build_descriptor(&server, "mock-header", ClientAuthMethod::ClientSecretBasic);
	let (flow, store) = build_reqwest_test_flow(descriptor, config());
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"T\\nX\",\"token_type\":\"bearer\"}");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me");
			then.status(200).body("{\"id\":\"u1\"}");
		})
		.await;
	let err = flow
		.validate_callback("code1")
		.await
		.expect_err("A token with a line break cannot be sent as a bearer credential.");

	assert!(
		matches!(
			err,
			Error::TokenExchangeFailed {
				cause: RequestError::MalformedResponse { status: 200, .. }
			}
		),
		"Unexpected error: {err:?}."
	);

	profile_mock.assert_calls_async(0).await;

	assert!(store.is_empty());
}

#[tokio::test]
async fn spotify_flow_decodes_typed_profiles() {
	let server = MockServer::start_async().await;
	let descriptor =
		build_descriptor(&server, spotify::PROVIDER_ID, ClientAuthMethod::ClientSecretBasic);
	let store = Arc::new(MemoryAccountStore::default());
	let flow = spotify::spotify_flow(
		store.clone(),
		descriptor,
		SpotifyConfig::new(config()).with_show_dialog(true),
		test_reqwest_http_client(),
		ReqwestTransportErrorMapper,
	);
	let _token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").header("authorization", BASIC_AUTH);
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let _profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me").header("authorization", "Bearer T");
			then.status(200).header("content-type", "application/json").body(
				"{\"display_name\":\"JM Wizzler\",\"external_urls\":{\"spotify\":\"https://open.spotify.com/user/wizzler\"},\"followers\":{\"href\":null,\"total\":3829},\"href\":\"https://api.spotify.com/v1/users/wizzler\",\"id\":\"wizzler\",\"images\":[],\"type\":\"user\",\"uri\":\"spotify:user:wizzler\"}",
			);
		})
		.await;
	let request = flow.authorization_url(None).expect("Authorize URL should build.");

	assert!(request.url.as_str().ends_with(&format!("&state={}&show_dialog=true", request.state)));

	let outcome =
		flow.validate_callback("code1").await.expect("Spotify callback should succeed.");

	assert_eq!(outcome.provider_user.profile.display_name.as_deref(), Some("JM Wizzler"));
	assert_eq!(outcome.provider_user.id, provider_user_id("wizzler"));
	assert_eq!(&*outcome.account.provider_id, spotify::PROVIDER_ID);
	assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn github_flow_posts_credentials_and_accepts_numeric_ids() {
	let server = MockServer::start_async().await;
	let descriptor =
		build_descriptor(&server, github::PROVIDER_ID, ClientAuthMethod::ClientSecretPost);
	let store = Arc::new(MemoryAccountStore::default());
	let flow = github::github_flow(
		store.clone(),
		descriptor,
		GitHubConfig::new(config()),
		test_reqwest_http_client(),
		ReqwestTransportErrorMapper,
	);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").body(format!(
				"{EXCHANGE_FORM}&client_id={CLIENT_ID}&client_secret={CLIENT_SECRET}"
			));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"gho_T\",\"token_type\":\"bearer\",\"scope\":\"read:user\"}");
		})
		.await;
	let _profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me").header("authorization", "Bearer gho_T");
			then.status(200).header("content-type", "application/json").body(
				"{\"login\":\"octocat\",\"id\":583231,\"node_id\":\"MDQ6VXNlcjU4MzIzMQ==\",\"avatar_url\":\"https://avatars.githubusercontent.com/u/583231\",\"html_url\":\"https://github.com/octocat\",\"name\":null,\"email\":null,\"company\":null,\"location\":null,\"bio\":null,\"type\":\"User\"}",
			);
		})
		.await;
	let outcome = flow.validate_callback("code1").await.expect("GitHub callback should succeed.");

	token_mock.assert_calls_async(1).await;

	assert_eq!(outcome.provider_user.id, provider_user_id("583231"));
	assert_eq!(outcome.provider_user.profile.login, "octocat");
	assert_eq!(outcome.tokens.access_token_expires_in, None);
	assert!(outcome.tokens.refresh_token.is_none());

	let linked = store
		.lookup(&outcome.account.provider_id, &provider_user_id("583231"))
		.await
		.expect("Store lookup should succeed.");

	assert_eq!(linked.map(|account| account.user_id), Some(outcome.account.user_id));
}
