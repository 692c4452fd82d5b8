//! Monasca endpoint discovery from the Keystone service catalog.
//!
//! Only used in password mode when no explicit `monasca_api_url` was given.
//! This is the one speculative network crossing in the pipeline, so every
//! transport or parse failure is translated into a typed [`MonascaError::Discovery`].

use serde::Deserialize;
use url::Url;

use super::auth::Session;
use crate::error::MonascaError;

/// What to look for in the catalog.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Monasca API version in its underscore form, e.g. "2_0".
    pub api_version: String,
    /// Region the endpoint must be registered in.
    pub region: String,
    /// Ordered interface preference; the first interface with a matching
    /// endpoint wins.
    pub interfaces: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogService {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogEndpoint {
    pub interface: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_id: Option<String>,
    pub url: String,
}

impl CatalogEndpoint {
    fn in_region(&self, region: &str) -> bool {
        self.region.as_deref() == Some(region) || self.region_id.as_deref() == Some(region)
    }
}

#[derive(Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    catalog: Vec<CatalogService>,
}

/// Discover the Monasca API URL via `GET /auth/catalog`.
pub async fn resolve(session: &Session, config: &EndpointConfig) -> Result<String, MonascaError> {
    let client = super::http_client()?;
    let url = format!(
        "{}/auth/catalog",
        session.auth_url.as_str().trim_end_matches('/')
    );

    tracing::debug!("GET {} (endpoint discovery)", url);

    let response = client
        .get(&url)
        .header("X-Auth-Token", &session.token)
        .send()
        .await
        .map_err(|e| MonascaError::Discovery {
            status: None,
            body: e.to_string(),
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| MonascaError::Discovery {
        status: Some(status.as_u16()),
        body: e.to_string(),
    })?;

    if !status.is_success() {
        return Err(MonascaError::Discovery {
            status: Some(status.as_u16()),
            body,
        });
    }

    let parsed: CatalogResponse =
        serde_json::from_str(&body).map_err(|e| MonascaError::Discovery {
            status: Some(status.as_u16()),
            body: format!("malformed catalog response: {e}"),
        })?;

    let endpoint = select_endpoint(&parsed.catalog, config).ok_or_else(|| {
        MonascaError::Discovery {
            status: None,
            body: format!(
                "no monitoring endpoint in region {} for interfaces {:?}",
                config.region, config.interfaces
            ),
        }
    })?;

    let resolved = with_version(endpoint, &config.api_version)?;
    tracing::debug!("discovered monasca endpoint {}", resolved);
    Ok(resolved)
}

/// Pick the first endpoint of a "monitoring" service matching the requested
/// region, honouring the ordered interface preference.
pub fn select_endpoint<'a>(
    catalog: &'a [CatalogService],
    config: &EndpointConfig,
) -> Option<&'a str> {
    for interface in &config.interfaces {
        for service in catalog.iter().filter(|s| s.service_type == "monitoring") {
            for endpoint in &service.endpoints {
                if &endpoint.interface == interface && endpoint.in_region(&config.region) {
                    return Some(&endpoint.url);
                }
            }
        }
    }
    None
}

/// Ensure the endpoint URL carries the requested version segment.
///
/// "2_0" maps to a "v2.0" path segment. Bare endpoints get the segment
/// appended; an endpoint already pinned to a different version is rejected.
fn with_version(endpoint: &str, api_version: &str) -> Result<String, MonascaError> {
    let segment = format!("v{}", api_version.replace('_', "."));

    let mut url = Url::parse(endpoint).map_err(|e| MonascaError::Discovery {
        status: None,
        body: format!("catalog endpoint {endpoint} is not a valid URL: {e}"),
    })?;

    let last = url
        .path_segments()
        .and_then(|mut s| s.next_back().map(str::to_string))
        .filter(|s| !s.is_empty());

    match last {
        Some(existing) if existing == segment => Ok(url.to_string()),
        Some(existing) if looks_like_version(&existing) => Err(MonascaError::Discovery {
            status: None,
            body: format!(
                "catalog endpoint {endpoint} is pinned to {existing}, requested {segment}"
            ),
        }),
        _ => {
            url.path_segments_mut()
                .map_err(|_| MonascaError::Discovery {
                    status: None,
                    body: format!("catalog endpoint {endpoint} cannot carry a path"),
                })?
                .pop_if_empty()
                .push(&segment);
            Ok(url.to_string())
        }
    }
}

fn looks_like_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|rest| rest.chars().next().is_some_and(|c| c.is_ascii_digit()))
}
