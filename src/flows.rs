//! Authorization-code flow orchestration for a single provider.
//!
//! [`ProviderFlow`] holds everything one provider integration needs (descriptor, client
//! configuration, transport, and account store) and implements [`OAuthProvider`], the
//! two-call contract applications code against: build an authorize URL, then validate
//! the callback.

pub mod authorize;
pub mod callback;

pub use authorize::*;
pub use callback::*;

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	http::ProviderHttpClient,
	oauth::{RequestExecutor, TransportErrorMapper},
	provider::{ProviderConfig, ProviderDescriptor},
	store::AccountStore,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Flow specialized for the crate's default reqwest transport stack.
pub type ReqwestProviderFlow<P = serde_json::Value> =
	ProviderFlow<ReqwestHttpClient, ReqwestTransportErrorMapper, P>;

/// Boxed future returned by [`OAuthProvider`] operations.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Contract shared by every provider integration.
pub trait OAuthProvider
where
	Self: Send + Sync,
{
	/// Profile payload attached to [`CallbackOutcome::provider_user`].
	type User: Send;

	/// Identifier recorded on linked accounts.
	fn provider_id(&self) -> &ProviderId;

	/// Issues a fresh `state` and the authorize URL that carries it.
	///
	/// `redirect_uri` overrides the configured redirect for this URL only.
	fn authorization_url(&self, redirect_uri: Option<&str>) -> Result<AuthorizationRequest>;

	/// Exchanges `code`, fetches the provider profile, and links it to a local account.
	///
	/// Verifying the returned `state` is the caller's job and must happen before this call.
	fn validate_callback<'a>(
		&'a self,
		code: &'a str,
	) -> ProviderFuture<'a, CallbackOutcome<Self::User>>;
}

/// Authorization-code flow bound to one provider descriptor.
///
/// `P` is the profile shape decoded from the user-info endpoint; it defaults to a raw
/// [`serde_json::Value`]. The flow holds only immutable data and shared handles, so it can
/// be cloned freely and shared across tasks.
pub struct ProviderFlow<C, M, P = serde_json::Value>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Executor used for the token and profile requests.
	pub executor: RequestExecutor<C, M>,
	/// Store that links external identities to local accounts.
	pub store: Arc<dyn AccountStore>,
	/// Provider descriptor that defines endpoints and quirks.
	pub descriptor: ProviderDescriptor,
	/// Client credentials, scopes, and the default redirect URI.
	pub config: ProviderConfig,
	/// Provider-specific parameters appended to every authorize URL, in order.
	pub authorize_params: Vec<(String, String)>,
	profile: PhantomData<fn() -> P>,
}
impl<C, M> ProviderFlow<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a flow that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		store: Arc<dyn AccountStore>,
		descriptor: ProviderDescriptor,
		config: ProviderConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			executor: RequestExecutor::new(http_client, mapper),
			store,
			descriptor,
			config,
			authorize_params: Vec::new(),
			profile: PhantomData,
		}
	}
}
#[cfg(feature = "reqwest")]
impl ProviderFlow<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new flow for the provided descriptor and client configuration.
	///
	/// The flow provisions its own reqwest-backed transport so callers do not need to pass
	/// HTTP handles explicitly.
	pub fn new(
		store: Arc<dyn AccountStore>,
		descriptor: ProviderDescriptor,
		config: ProviderConfig,
	) -> Self {
		Self::with_http_client(
			store,
			descriptor,
			config,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M, P> ProviderFlow<C, M, P>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Appends a provider-specific authorize parameter.
	pub fn with_authorize_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.authorize_params.push((key.into(), value.into()));

		self
	}

	/// Switches the profile shape decoded from the user-info endpoint.
	pub fn with_profile<Q>(self) -> ProviderFlow<C, M, Q> {
		let Self { executor, store, descriptor, config, authorize_params, .. } = self;

		ProviderFlow { executor, store, descriptor, config, authorize_params, profile: PhantomData }
	}
}
impl<C, M, P> Clone for ProviderFlow<C, M, P>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			executor: self.executor.clone(),
			store: self.store.clone(),
			descriptor: self.descriptor.clone(),
			config: self.config.clone(),
			authorize_params: self.authorize_params.clone(),
			profile: PhantomData,
		}
	}
}
impl<C, M, P> Debug for ProviderFlow<C, M, P>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderFlow")
			.field("descriptor", &self.descriptor)
			.field("config", &self.config)
			.field("authorize_params", &self.authorize_params)
			.finish()
	}
}
impl<C, M, P> OAuthProvider for ProviderFlow<C, M, P>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
	P: 'static + Send + DeserializeOwned,
{
	type User = P;

	fn provider_id(&self) -> &ProviderId {
		&self.descriptor.id
	}

	fn authorization_url(&self, redirect_uri: Option<&str>) -> Result<AuthorizationRequest> {
		ProviderFlow::authorization_url(self, redirect_uri)
	}

	fn validate_callback<'a>(
		&'a self,
		code: &'a str,
	) -> ProviderFuture<'a, CallbackOutcome<Self::User>> {
		Box::pin(ProviderFlow::validate_callback(self, code))
	}
}
