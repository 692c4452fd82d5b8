//! Error taxonomy for the reconciliation pipeline.
//!
//! Every failure is terminal for the invocation: there are no retries, and
//! the invocation boundary folds these into the structured result payload
//! rather than propagating them to the caller.

use thiserror::Error;

/// Errors surfaced by the authentication, discovery, and resource layers.
#[derive(Debug, Error)]
pub enum MonascaError {
    /// Contradictory or insufficient input, detected before any network call.
    #[error("configuration error: {0}")]
    Config(String),

    /// Keystone rejected the credentials or was unreachable.
    #[error("keystone authentication failed: {0}")]
    Auth(String),

    /// Catalog lookup failed or no matching monitoring endpoint exists.
    #[error("endpoint discovery failed: {}{body}", fmt_status(.status))]
    Discovery { status: Option<u16>, body: String },

    /// A Monasca call returned an unexpected status or a response lacking an
    /// expected identifier. The body is carried verbatim for diagnostics.
    #[error("monasca api error: {}{body}", fmt_status(.status))]
    Api { status: Option<u16>, body: String },
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("{code} "),
        None => String::new(),
    }
}

impl MonascaError {
    /// An `Api` error from an HTTP status + body pair.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        MonascaError::Api {
            status: Some(status),
            body: body.into(),
        }
    }

    /// An `Api` error for a transport-level failure (no status available).
    pub fn api_transport(err: reqwest::Error) -> Self {
        MonascaError::Api {
            status: None,
            body: err.to_string(),
        }
    }
}
