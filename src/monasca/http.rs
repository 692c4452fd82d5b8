//! HTTP utilities for Monasca REST API calls.

use reqwest::{Client, Method};
use serde_json::Value;

use crate::error::MonascaError;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging.
/// Truncates long responses and strips non-printable characters.
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..MAX_LOG_BODY_LENGTH],
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper attaching the session token to every Monasca call.
#[derive(Clone)]
pub struct MonascaHttp {
    client: Client,
    base: String,
    token: String,
}

impl MonascaHttp {
    pub fn new(base: &str, token: &str) -> Result<Self, MonascaError> {
        let client = Client::builder()
            .user_agent(concat!("monasca-reconcile/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MonascaError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub async fn get(&self, path: &str) -> Result<(u16, String), MonascaError> {
        self.execute(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<(u16, String), MonascaError> {
        self.execute(Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: &Value) -> Result<(u16, String), MonascaError> {
        self.execute(Method::PATCH, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<(u16, String), MonascaError> {
        self.execute(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(u16, String), MonascaError> {
        self.execute(Method::DELETE, path, None).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(u16, String), MonascaError> {
        let url = format!("{}/{}", self.base, path.trim_start_matches('/'));
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("X-Auth-Token", &self.token);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(MonascaError::api_transport)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(MonascaError::api_transport)?;

        if !(200..300).contains(&status) {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} {} - {}", method, status, sanitize_for_log(&text));
        }

        Ok((status, text))
    }
}
