//! Invocation boundary.
//!
//! Translates parameters into a desired state, drives authenticate →
//! (resolve) → list → reconcile → mutate, and maps the outcome to one
//! structured result per invocation. These entry points never return an
//! error: every failure path terminates in a payload with `error` set.

use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::error::MonascaError;
use crate::keystone::auth::{self, Credentials, PasswordCredentials};
use crate::keystone::catalog::{self, EndpointConfig};
use crate::monasca::client::MonascaClient;
use crate::params::{AlarmSpec, Connection, NotificationSpec};
use crate::reconcile::{reconcile, Outcome};

/// Structured result of one reconcile invocation.
#[derive(Debug, Clone)]
pub struct ModuleResult {
    pub changed: bool,
    /// JSON key the resource id is reported under, per resource kind.
    pub id_key: &'static str,
    pub resource_id: Option<String>,
    pub monasca_api_url: Option<String>,
    pub error: Option<String>,
}

impl ModuleResult {
    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("changed".to_string(), Value::Bool(self.changed));
        if let Some(id) = &self.resource_id {
            map.insert(self.id_key.to_string(), Value::String(id.clone()));
        }
        if let Some(url) = &self.monasca_api_url {
            map.insert("monasca_api_url".to_string(), Value::String(url.clone()));
        }
        if let Some(error) = &self.error {
            map.insert("error".to_string(), Value::String(error.clone()));
        }
        Value::Object(map)
    }

    fn success(id_key: &'static str, outcome: &Outcome, api_url: String) -> Self {
        Self {
            changed: outcome.changed(),
            id_key,
            resource_id: outcome.id().map(str::to_string),
            monasca_api_url: Some(api_url),
            error: None,
        }
    }

    fn failure(id_key: &'static str, api_url: Option<String>, err: MonascaError) -> Self {
        Self {
            changed: false,
            id_key,
            resource_id: None,
            monasca_api_url: api_url,
            error: Some(err.to_string()),
        }
    }
}

/// Validate, authenticate, and resolve the Monasca endpoint.
async fn connect(conn: &Connection) -> Result<MonascaClient, MonascaError> {
    conn.validate()?;

    let auth_url = Url::parse(&conn.keystone_url)
        .map_err(|e| MonascaError::Config(format!("invalid keystone_url: {e}")))?;

    let credentials = match &conn.keystone_token {
        Some(token) => Credentials::Token(token.clone()),
        // validate() guarantees user and password are set in password mode
        None => Credentials::Password(PasswordCredentials {
            username: conn.keystone_user.clone().unwrap_or_default(),
            password: conn.keystone_password.clone().unwrap_or_default(),
            project_name: conn.keystone_project.clone(),
            user_domain_id: conn.user_domain_id.clone(),
            project_domain_id: conn.project_domain_id.clone(),
        }),
    };

    let session = auth::authenticate(&auth_url, &credentials).await?;

    let api_url = match &conn.monasca_api_url {
        Some(explicit) => explicit.clone(),
        None => {
            catalog::resolve(
                &session,
                &EndpointConfig {
                    api_version: conn.api_version.clone(),
                    region: conn.endpoint_region().to_string(),
                    interfaces: conn.endpoint_interfaces(),
                },
            )
            .await?
        }
    };

    MonascaClient::new(&api_url, &session.token)
}

/// Reconcile one alarm definition.
pub async fn run_alarm_definition(
    conn: &Connection,
    spec: &AlarmSpec,
    check_mode: bool,
) -> ModuleResult {
    const ID_KEY: &str = "alarm_definition_id";

    let client = match connect(conn).await {
        Ok(client) => client,
        Err(e) => return ModuleResult::failure(ID_KEY, None, e),
    };
    let api_url = client.api_url().to_string();

    match reconcile(&client.alarm_definitions(), spec, check_mode).await {
        Ok(outcome) => ModuleResult::success(ID_KEY, &outcome, api_url),
        Err(e) => ModuleResult::failure(ID_KEY, Some(api_url), e),
    }
}

/// Reconcile one notification method.
pub async fn run_notification_method(
    conn: &Connection,
    spec: &NotificationSpec,
    check_mode: bool,
) -> ModuleResult {
    const ID_KEY: &str = "notification_method_id";

    let client = match connect(conn).await {
        Ok(client) => client,
        Err(e) => return ModuleResult::failure(ID_KEY, None, e),
    };
    let api_url = client.api_url().to_string();

    match reconcile(&client.notification_methods(), spec, check_mode).await {
        Ok(outcome) => ModuleResult::success(ID_KEY, &outcome, api_url),
        Err(e) => ModuleResult::failure(ID_KEY, Some(api_url), e),
    }
}

/// A batch of desired resources, as loaded from a YAML apply file.
///
/// Notification methods are applied before alarm definitions so their ids
/// can be referenced from alarm action lists.
#[derive(Debug, Deserialize)]
pub struct ApplyFile {
    #[serde(default)]
    pub notification_methods: Vec<NotificationSpec>,
    #[serde(default)]
    pub alarm_definitions: Vec<AlarmSpec>,
}

/// Apply a batch sequentially, stopping at the first failure.
pub async fn run_apply(conn: &Connection, file: &ApplyFile, check_mode: bool) -> Vec<ModuleResult> {
    let mut results = Vec::new();

    for spec in &file.notification_methods {
        let result = run_notification_method(conn, spec, check_mode).await;
        let failed = result.failed();
        results.push(result);
        if failed {
            return results;
        }
    }

    for spec in &file.alarm_definitions {
        let result = run_alarm_definition(conn, spec, check_mode).await;
        let failed = result.failed();
        results.push(result);
        if failed {
            return results;
        }
    }

    results
}
