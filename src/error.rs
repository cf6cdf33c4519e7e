//! Error taxonomy shared by the executor, flows, providers, and account stores.

// self
use crate::{_prelude::*, http::Endpoint};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every callback step fails with its own tagged variant so callers can tell which leg of
/// the flow aborted while still reaching the underlying cause through
/// [`std::error::Error::source`].
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// The authorization code could not be traded for tokens.
	#[error("Token exchange failed.")]
	TokenExchangeFailed {
		/// Request-level failure reported by the executor.
		#[source]
		cause: RequestError,
	},
	/// The provider profile could not be fetched with the issued access token.
	#[error("Provider user fetch failed.")]
	ProfileFetchFailed {
		/// Request-level failure reported by the executor.
		#[source]
		cause: RequestError,
	},
	/// The account store refused or failed to bind the external identity.
	#[error("Account linking failed.")]
	LinkFailed {
		/// Store-reported failure.
		#[source]
		cause: LinkError,
	},
}
impl Error {
	/// Returns the request-level cause for exchange and profile failures.
	pub fn request_error(&self) -> Option<&RequestError> {
		match self {
			Self::TokenExchangeFailed { cause } | Self::ProfileFetchFailed { cause } => Some(cause),
			_ => None,
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A base or redirect URL cannot be parsed.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending input.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Configured scopes cannot be normalized.
	#[error("Configured scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Provider descriptor failed validation.
	#[error("Provider descriptor is invalid.")]
	InvalidDescriptor(#[from] crate::provider::ProviderDescriptorError),
	/// A configured identifier failed validation.
	#[error("Identifier is invalid.")]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Classified outcome of a failed provider request.
#[derive(Debug, ThisError)]
pub enum RequestError {
	/// The request never produced an HTTP response.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The provider answered with a non-2xx status.
	///
	/// The body is surfaced verbatim; provider-specific error schemas are left to callers.
	#[error("Provider responded with HTTP {status}.")]
	Provider {
		/// HTTP status code.
		status: u16,
		/// Raw response body (lossy UTF-8).
		body: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// The provider answered 2xx with a body that does not match the expected shape.
	#[error("Provider returned a malformed response: {detail}.")]
	MalformedResponse {
		/// HTTP status code of the offending response.
		status: u16,
		/// Human-readable summary (includes the JSON path when known).
		detail: String,
		/// Structured parsing failure, when the body was not valid for the target type.
		#[source]
		source: Option<serde_path_to_error::Error<serde_json::Error>>,
	},
}
impl RequestError {
	/// HTTP status associated with the failure, when a response was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Transport(_) => None,
			Self::Provider { status, .. } | Self::MalformedResponse { status, .. } => Some(*status),
		}
	}

	/// Raw provider body for non-2xx responses.
	pub fn provider_body(&self) -> Option<&str> {
		match self {
			Self::Provider { body, .. } => Some(body),
			_ => None,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client gave up waiting for the provider.
	#[error("Request to the {endpoint} endpoint timed out.")]
	Timeout {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred during transport.")]
	Io(#[from] std::io::Error),
	/// Any other client-side failure reported by the transport.
	#[error("HTTP client error occurred while calling the {endpoint} endpoint: {message}.")]
	Other {
		/// Endpoint being called.
		endpoint: Endpoint,
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(endpoint: Endpoint, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(endpoint: Endpoint, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { endpoint, source: Box::new(src) }
	}
}

/// Failures reported by [`AccountStore`](crate::store::AccountStore) implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum LinkError {
	/// The backing store could not be reached or failed mid-operation.
	#[error("Account store is unavailable: {message}.")]
	StoreUnavailable {
		/// Human-readable error payload.
		message: String,
	},
	/// The external identity is already bound to a different local account.
	#[error("Provider user `{provider_user_id}` on `{provider_id}` is already bound: {message}.")]
	ConflictingBinding {
		/// Provider identifier.
		provider_id: String,
		/// External user identifier.
		provider_user_id: String,
		/// Store-supplied detail.
		message: String,
	},
}
impl LinkError {
	/// Builds a [`LinkError::StoreUnavailable`] from any message.
	pub fn unavailable(message: impl Into<String>) -> Self {
		Self::StoreUnavailable { message: message.into() }
	}
}
