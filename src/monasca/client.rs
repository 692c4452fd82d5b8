//! Typed Monasca API client.
//!
//! One [`MonascaClient`] per invocation, constructed from the resolved
//! endpoint and the session token. The per-kind handles implement
//! [`ResourceApi`] so the generic reconciler can drive them.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::alarm::{self, AlarmDefinition};
use super::http::MonascaHttp;
use super::notification::{self, NotificationMethod};
use crate::error::MonascaError;
use crate::params::{AlarmSpec, NotificationSpec, State};
use crate::reconcile::ResourceApi;

/// Main Monasca client.
#[derive(Clone)]
pub struct MonascaClient {
    http: MonascaHttp,
    api_url: String,
}

impl MonascaClient {
    pub fn new(api_url: &str, token: &str) -> Result<Self, MonascaError> {
        Ok(Self {
            http: MonascaHttp::new(api_url, token)?,
            api_url: api_url.to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn alarm_definitions(&self) -> AlarmDefinitionApi<'_> {
        AlarmDefinitionApi { client: self }
    }

    pub fn notification_methods(&self) -> NotificationMethodApi<'_> {
        NotificationMethodApi { client: self }
    }

    /// GET a collection endpoint; Monasca wraps lists in an `elements` array.
    async fn list_elements<R: DeserializeOwned>(&self, path: &str) -> Result<Vec<R>, MonascaError> {
        let (status, body) = self.http.get(path).await?;
        if status != 200 {
            return Err(MonascaError::api(status, body));
        }

        #[derive(serde::Deserialize)]
        struct Elements<R> {
            #[serde(default = "Vec::new")]
            elements: Vec<R>,
        }

        let parsed: Elements<R> =
            serde_json::from_str(&body).map_err(|e| MonascaError::Api {
                status: Some(status),
                body: format!("failed to parse list response: {e}"),
            })?;
        Ok(parsed.elements)
    }

    /// Success for create/update means the response body carries an `id`;
    /// its absence surfaces the body verbatim.
    fn id_from_response(status: u16, body: String) -> Result<String, MonascaError> {
        if !(200..300).contains(&status) {
            return Err(MonascaError::api(status, body));
        }
        let parsed: Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(_) => return Err(MonascaError::api(status, body)),
        };
        match parsed.get("id").and_then(Value::as_str) {
            Some(id) => Ok(id.to_string()),
            None => Err(MonascaError::api(status, body)),
        }
    }

    /// Delete succeeds only on HTTP 204.
    fn check_deleted(status: u16, body: String) -> Result<(), MonascaError> {
        if status == 204 {
            Ok(())
        } else {
            Err(MonascaError::api(status, body))
        }
    }
}

/// Alarm definition bindings: `/alarm-definitions`, update via PATCH.
pub struct AlarmDefinitionApi<'a> {
    client: &'a MonascaClient,
}

impl ResourceApi for AlarmDefinitionApi<'_> {
    type Desired = AlarmSpec;
    type Remote = AlarmDefinition;

    fn desired_name(desired: &AlarmSpec) -> &str {
        &desired.name
    }
    fn desired_state(desired: &AlarmSpec) -> State {
        desired.state
    }
    fn remote_name(remote: &AlarmDefinition) -> &str {
        &remote.name
    }
    fn remote_id(remote: &AlarmDefinition) -> &str {
        &remote.id
    }
    fn up_to_date(desired: &AlarmSpec, remote: &AlarmDefinition) -> bool {
        alarm::up_to_date(desired, remote)
    }

    async fn list(&self) -> Result<Vec<AlarmDefinition>, MonascaError> {
        self.client.list_elements("alarm-definitions").await
    }

    async fn create(&self, desired: &AlarmSpec) -> Result<String, MonascaError> {
        let (status, body) = self
            .client
            .http
            .post("alarm-definitions", &alarm::request_body(desired))
            .await?;
        MonascaClient::id_from_response(status, body)
    }

    async fn update(&self, id: &str, desired: &AlarmSpec) -> Result<String, MonascaError> {
        let (status, body) = self
            .client
            .http
            .patch(&format!("alarm-definitions/{id}"), &alarm::request_body(desired))
            .await?;
        MonascaClient::id_from_response(status, body)
    }

    async fn delete(&self, id: &str) -> Result<(), MonascaError> {
        let (status, body) = self
            .client
            .http
            .delete(&format!("alarm-definitions/{id}"))
            .await?;
        MonascaClient::check_deleted(status, body)
    }
}

/// Notification method bindings: `/notification-methods`, update via PUT.
pub struct NotificationMethodApi<'a> {
    client: &'a MonascaClient,
}

impl ResourceApi for NotificationMethodApi<'_> {
    type Desired = NotificationSpec;
    type Remote = NotificationMethod;

    fn desired_name(desired: &NotificationSpec) -> &str {
        &desired.name
    }
    fn desired_state(desired: &NotificationSpec) -> State {
        desired.state
    }
    fn remote_name(remote: &NotificationMethod) -> &str {
        &remote.name
    }
    fn remote_id(remote: &NotificationMethod) -> &str {
        &remote.id
    }
    fn up_to_date(desired: &NotificationSpec, remote: &NotificationMethod) -> bool {
        notification::up_to_date(desired, remote)
    }

    async fn list(&self) -> Result<Vec<NotificationMethod>, MonascaError> {
        self.client.list_elements("notification-methods").await
    }

    async fn create(&self, desired: &NotificationSpec) -> Result<String, MonascaError> {
        let (status, body) = self
            .client
            .http
            .post("notification-methods", &notification::request_body(desired))
            .await?;
        MonascaClient::id_from_response(status, body)
    }

    async fn update(&self, id: &str, desired: &NotificationSpec) -> Result<String, MonascaError> {
        let (status, body) = self
            .client
            .http
            .put(
                &format!("notification-methods/{id}"),
                &notification::request_body(desired),
            )
            .await?;
        MonascaClient::id_from_response(status, body)
    }

    async fn delete(&self, id: &str) -> Result<(), MonascaError> {
        let (status, body) = self
            .client
            .http
            .delete(&format!("notification-methods/{id}"))
            .await?;
        MonascaClient::check_deleted(status, body)
    }
}
