//! Keystone session construction.
//!
//! Two mutually exclusive modes: exchange long-lived credentials for a
//! short-lived token via the Keystone v3 password flow, or wrap a pre-issued
//! token without any network round-trip. Mode validation (token excludes
//! user/password and discovery options) happens upstream in
//! [`crate::params::Connection::validate`].

use serde_json::json;
use url::Url;

use crate::error::MonascaError;

/// An authenticated Keystone session. Created per invocation, never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub auth_url: Url,
}

/// Inputs for the Keystone v3 password exchange.
#[derive(Debug, Clone)]
pub struct PasswordCredentials {
    pub username: String,
    pub password: String,
    pub project_name: String,
    pub user_domain_id: String,
    pub project_domain_id: String,
}

/// How to obtain a session.
#[derive(Debug, Clone)]
pub enum Credentials {
    Password(PasswordCredentials),
    Token(String),
}

/// Obtain a usable session for the Monasca API.
///
/// Token mode constructs the session directly; password mode performs exactly
/// one POST to the identity service. The catalog is not requested here — the
/// resolver fetches it separately when discovery is needed.
pub async fn authenticate(auth_url: &Url, credentials: &Credentials) -> Result<Session, MonascaError> {
    match credentials {
        Credentials::Token(token) => Ok(Session {
            token: token.clone(),
            auth_url: auth_url.clone(),
        }),
        Credentials::Password(creds) => password_exchange(auth_url, creds).await,
    }
}

async fn password_exchange(
    auth_url: &Url,
    creds: &PasswordCredentials,
) -> Result<Session, MonascaError> {
    let client = super::http_client()?;
    let url = format!(
        "{}/auth/tokens?nocatalog",
        auth_url.as_str().trim_end_matches('/')
    );

    let payload = json!({
        "auth": {
            "identity": {
                "methods": ["password"],
                "password": {
                    "user": {
                        "name": creds.username,
                        "domain": { "id": creds.user_domain_id },
                        "password": creds.password,
                    }
                }
            },
            "scope": {
                "project": {
                    "name": creds.project_name,
                    "domain": { "id": creds.project_domain_id },
                }
            }
        }
    });

    tracing::debug!("POST {} (keystone password auth)", url);

    let response = client
        .post(&url)
        .json(&payload)
        .send()
        .await
        .map_err(|e| MonascaError::Auth(format!("keystone unreachable: {e}")))?;

    let status = response.status();
    let token = response
        .headers()
        .get("X-Subject-Token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(MonascaError::Auth(format!("{} {}", status.as_u16(), body)));
    }

    let Some(token) = token else {
        return Err(MonascaError::Auth(
            "keystone response missing X-Subject-Token header".to_string(),
        ));
    };

    tracing::debug!("keystone session established for project {}", creds.project_name);

    Ok(Session {
        token,
        auth_url: auth_url.clone(),
    })
}
