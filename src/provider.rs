//! Provider-facing configuration (data) and the built-in provider instantiations.
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering HTTPS-only
//! endpoints, the token endpoint's client authentication method, and provider quirks
//! (scope delimiter, default scopes, profile id field). `config` holds the per-application
//! client credentials. `spotify` and `github` wire both into ready-made flows.

pub mod config;
pub mod descriptor;
pub mod github;
pub mod spotify;

pub use config::*;
pub use descriptor::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Parses a built-in endpoint constant.
fn endpoint(url: &str) -> Result<Url, ConfigError> {
	Url::parse(url).map_err(|source| ConfigError::InvalidUrl { url: url.to_owned(), source })
}
