//! Provider-agnostic OAuth 2.0 authorization-code integrations.
//!
//! A [`flows::ProviderFlow`] issues `state`, builds the authorize URL, and on callback trades
//! the code for tokens, fetches the provider profile, then links it to a local account.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use parking_lot::Mutex;

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::ProviderFlow,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{ProviderConfig, ProviderDescriptor},
		store::{AccountStore, MemoryAccountStore},
	};

	/// Flow type alias used by reqwest-backed integration tests.
	pub type ReqwestTestFlow = ProviderFlow<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`ProviderFlow`] backed by an in-memory account store and the reqwest
	/// transport used across integration tests.
	pub fn build_reqwest_test_flow(
		descriptor: ProviderDescriptor,
		config: ProviderConfig,
	) -> (ReqwestTestFlow, Arc<MemoryAccountStore>) {
		let store_backend = Arc::new(MemoryAccountStore::default());
		let store: Arc<dyn AccountStore> = store_backend.clone();
		let flow = ProviderFlow::with_http_client(
			store,
			descriptor,
			config,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		);

		(flow, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		marker::PhantomData,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
