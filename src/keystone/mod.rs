//! Keystone identity interaction.
//!
//! - [`auth`] - Session construction from a password exchange or a pre-issued token
//! - [`catalog`] - Monasca endpoint discovery from the service catalog

pub mod auth;
pub mod catalog;

use crate::error::MonascaError;

/// Build the reqwest client used for identity calls.
pub(crate) fn http_client() -> Result<reqwest::Client, MonascaError> {
    reqwest::Client::builder()
        .user_agent(concat!("monasca-reconcile/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| MonascaError::Config(format!("failed to create HTTP client: {e}")))
}
