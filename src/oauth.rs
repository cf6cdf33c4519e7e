//! Request executor plus the wire-level builders for token and profile requests.
//!
//! [`RequestExecutor`] is the single chokepoint for outbound provider calls: it sends
//! through a [`ProviderHttpClient`], then classifies the outcome as a transport failure, a
//! provider rejection (non-2xx, body surfaced verbatim), a malformed 2xx body, or a typed
//! success.

pub use oauth2;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		HeaderValue, Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
	},
};
use url::form_urlencoded::Serializer as FormSerializer;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, RequestError, TransportError},
	http::{Endpoint, ProviderHttpClient, parse_retry_after},
	provider::{ClientAuthMethod, ProviderConfig, ProviderDescriptor},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Maps HTTP transport failures into [`TransportError`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a transport error.
	fn map_transport_error(&self, endpoint: Endpoint, error: HttpClientError<E>)
	-> TransportError;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: Endpoint,
		err: HttpClientError<ReqwestError>,
	) -> TransportError {
		match err {
			HttpClientError::Reqwest(inner) if inner.is_timeout() =>
				TransportError::timeout(endpoint, *inner),
			HttpClientError::Reqwest(inner) => TransportError::network(endpoint, *inner),
			HttpClientError::Http(inner) =>
				TransportError::Other { endpoint, message: inner.to_string() },
			HttpClientError::Io(inner) => TransportError::Io(inner),
			HttpClientError::Other(message) => TransportError::Other { endpoint, message },
			_ => TransportError::Other { endpoint, message: "unrecognized client failure".into() },
		}
	}
}

/// Issues provider requests and classifies their outcomes.
pub struct RequestExecutor<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
}
impl<C, M> RequestExecutor<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an executor from a transport + mapper pair.
	pub fn new(http_client: impl Into<Arc<C>>, transport_mapper: impl Into<Arc<M>>) -> Self {
		Self { http_client: http_client.into(), transport_mapper: transport_mapper.into() }
	}

	/// Sends `request` to `endpoint` and decodes a 2xx JSON body into `T`.
	///
	/// Requests are never retried. `Accept` and `User-Agent` headers are filled in when
	/// the caller did not set them.
	pub async fn execute<T>(&self, endpoint: Endpoint, request: HttpRequest) -> Result<T, RequestError>
	where
		T: DeserializeOwned,
	{
		let response = self.send(endpoint, request).await?;

		decode_body(response.status().as_u16(), response.body())
	}

	/// Sends `request` and returns the raw 2xx response.
	///
	/// Transport failures and non-2xx statuses are classified exactly like
	/// [`execute`](Self::execute); the body is left for the caller to interpret.
	pub async fn send(
		&self,
		endpoint: Endpoint,
		mut request: HttpRequest,
	) -> Result<HttpResponse, RequestError> {
		let headers = request.headers_mut();

		headers.entry(ACCEPT).or_insert(HeaderValue::from_static(JSON_CONTENT_TYPE));
		headers.entry(USER_AGENT).or_insert(HeaderValue::from_static(DEFAULT_USER_AGENT));

		let handle = self.http_client.handle();
		let response = handle
			.call(request)
			.await
			.map_err(|err| self.transport_mapper.map_transport_error(endpoint, err))?;
		let status = response.status();

		if !status.is_success() {
			return Err(RequestError::Provider {
				status: status.as_u16(),
				body: String::from_utf8_lossy(response.body()).into_owned(),
				retry_after: parse_retry_after(response.headers()),
			});
		}

		Ok(response)
	}
}
impl<C, M> Clone for RequestExecutor<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self { http_client: self.http_client.clone(), transport_mapper: self.transport_mapper.clone() }
	}
}
#[cfg(feature = "reqwest")]
impl Default for RequestExecutor<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	fn default() -> Self {
		Self::new(ReqwestHttpClient::default(), ReqwestTransportErrorMapper)
	}
}

/// Authorization header schemes understood by provider endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthScheme {
	/// `Authorization: Basic <credentials>`.
	Basic,
	/// `Authorization: Bearer <credentials>`.
	Bearer,
}
impl AuthScheme {
	const fn prefix(self) -> &'static str {
		match self {
			AuthScheme::Basic => "Basic",
			AuthScheme::Bearer => "Bearer",
		}
	}
}

/// Formats an `Authorization` header value. Basic credentials must already be encoded.
pub fn authorization_header(scheme: AuthScheme, credentials: &str) -> String {
	format!("{} {credentials}", scheme.prefix())
}

/// Encodes `client_id:client_secret` for HTTP Basic client authentication.
pub fn basic_credentials(client_id: &str, client_secret: &str) -> String {
	STANDARD.encode(format!("{client_id}:{client_secret}"))
}

/// Builds the form-encoded authorization-code exchange request.
pub(crate) fn token_request(
	descriptor: &ProviderDescriptor,
	config: &ProviderConfig,
	code: &str,
) -> Result<HttpRequest> {
	let mut form = FormSerializer::new(String::new());

	form.append_pair("code", code)
		.append_pair("grant_type", "authorization_code")
		.append_pair("redirect_uri", &config.redirect_uri);

	let mut builder = Request::builder()
		.method(Method::POST)
		.uri(descriptor.endpoints.token.as_str())
		.header(CONTENT_TYPE, FORM_CONTENT_TYPE);

	match descriptor.client_auth_method {
		ClientAuthMethod::ClientSecretBasic => {
			let credentials = basic_credentials(&config.client_id, &config.client_secret);

			builder =
				builder.header(AUTHORIZATION, authorization_header(AuthScheme::Basic, &credentials));
		},
		ClientAuthMethod::ClientSecretPost => {
			form.append_pair("client_id", &config.client_id)
				.append_pair("client_secret", &config.client_secret);
		},
	}

	builder.body(form.finish().into_bytes()).map_err(|e| ConfigError::from(e).into())
}

/// Builds the bearer-authenticated profile request.
pub(crate) fn user_info_request(
	descriptor: &ProviderDescriptor,
	access_token: &str,
) -> Result<HttpRequest> {
	Request::builder()
		.method(Method::GET)
		.uri(descriptor.endpoints.user_info.as_str())
		.header(AUTHORIZATION, authorization_header(AuthScheme::Bearer, access_token))
		.body(Vec::new())
		.map_err(|e| ConfigError::from(e).into())
}

/// Decodes a JSON body, reporting the failing path on error.
pub(crate) fn decode_body<T>(status: u16, body: &[u8]) -> Result<T, RequestError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|err| malformed_from_path(status, err))
}

/// Decodes an already parsed JSON value, reporting the failing path on error.
pub(crate) fn decode_value<T>(status: u16, value: serde_json::Value) -> Result<T, RequestError>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(value).map_err(|err| malformed_from_path(status, err))
}

fn malformed_from_path(
	status: u16,
	err: serde_path_to_error::Error<serde_json::Error>,
) -> RequestError {
	let detail = format!("failed to decode body at `{}`", err.path());

	RequestError::MalformedResponse { status, detail, source: Some(err) }
}
