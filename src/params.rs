//! Desired-state and connection parameters.
//!
//! These structs double as clap argument groups and serde-deserializable
//! records (the batch apply file), with the defaults applied consistently in
//! both paths. Validation happens once, at the invocation boundary, before
//! any network call.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MonascaError;

/// Whether the named resource should exist remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Present,
    Absent,
}

/// Alarm definition severity, as accepted by the Monasca API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[value(rename_all = "UPPER")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// Keystone/Monasca connection parameters.
///
/// Region and interface stay `Option` so that an explicit value can be told
/// apart from the default when checking mutual exclusivity against
/// `keystone_token`; use [`Connection::endpoint_region`] and
/// [`Connection::endpoint_interfaces`] for the effective values.
#[derive(Debug, Clone, Args)]
pub struct Connection {
    /// Monasca API version used for endpoint discovery and URL building.
    #[arg(long, default_value = "2_0")]
    pub api_version: String,

    /// Keystone URL to authenticate against, e.g. http://192.168.10.5:5000/v3
    #[arg(long)]
    pub keystone_url: String,

    /// Keystone project name to obtain a token for.
    #[arg(long)]
    pub keystone_project: String,

    /// Keystone user, required unless a keystone token is provided.
    #[arg(long)]
    pub keystone_user: Option<String>,

    /// Keystone password, required unless a keystone token is provided.
    #[arg(long)]
    pub keystone_password: Option<String>,

    /// Pre-issued Keystone token. Requires --monasca-api-url and excludes
    /// user/password and endpoint discovery options.
    #[arg(long)]
    pub keystone_token: Option<String>,

    /// Explicit Monasca API endpoint; skips catalog discovery.
    #[arg(long)]
    pub monasca_api_url: Option<String>,

    /// Domain id of the user.
    #[arg(long, default_value = "default")]
    pub user_domain_id: String,

    /// Domain id of the project.
    #[arg(long, default_value = "default")]
    pub project_domain_id: String,

    /// Region to match when discovering the Monasca endpoint.
    #[arg(long)]
    pub monasca_endpoint_region: Option<String>,

    /// Ordered interface preference for endpoint discovery.
    #[arg(long, value_delimiter = ',')]
    pub monasca_endpoint_interface: Option<Vec<String>>,
}

impl Connection {
    /// Effective discovery region (default "RegionOne").
    pub fn endpoint_region(&self) -> &str {
        self.monasca_endpoint_region.as_deref().unwrap_or("RegionOne")
    }

    /// Effective ordered interface preference (default admin, internal).
    pub fn endpoint_interfaces(&self) -> Vec<String> {
        self.monasca_endpoint_interface
            .clone()
            .unwrap_or_else(|| vec!["admin".to_string(), "internal".to_string()])
    }

    /// Check the parameter set for contradictions before any network call.
    ///
    /// A keystone token is mutually exclusive with user, password, and the
    /// endpoint discovery options, and requires an explicit API URL since
    /// discovery needs a password-derived session.
    pub fn validate(&self) -> Result<(), MonascaError> {
        if self.keystone_token.is_some() {
            for (set, other) in [
                (self.keystone_user.is_some(), "keystone_user"),
                (self.keystone_password.is_some(), "keystone_password"),
                (
                    self.monasca_endpoint_region.is_some(),
                    "monasca_endpoint_region",
                ),
                (
                    self.monasca_endpoint_interface.is_some(),
                    "monasca_endpoint_interface",
                ),
            ] {
                if set {
                    return Err(MonascaError::Config(format!(
                        "keystone_token and {other} are mutually exclusive"
                    )));
                }
            }
            if self.monasca_api_url.is_none() {
                return Err(MonascaError::Config(
                    "monasca_api_url is required when using keystone_token".to_string(),
                ));
            }
        } else if self.keystone_user.is_none() || self.keystone_password.is_none() {
            return Err(MonascaError::Config(
                "keystone_user and keystone_password are required unless keystone_token is given"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

fn default_match_by() -> Vec<String> {
    vec!["hostname".to_string()]
}

/// Desired state of one alarm definition.
#[derive(Debug, Clone, Args, Deserialize)]
pub struct AlarmSpec {
    /// The alarm definition name, used as the natural key for matching.
    #[arg(long)]
    pub name: String,

    /// Whether the alarm definition should exist.
    #[arg(long, value_enum, default_value = "present")]
    #[serde(default)]
    pub state: State,

    /// The alarm definition expression, required for create/update.
    #[arg(long)]
    pub expression: Option<String>,

    /// The description associated with the alarm definition.
    #[arg(long)]
    pub description: Option<String>,

    /// Dimension names the alarm is grouped by.
    #[arg(long, value_delimiter = ',', default_value = "hostname")]
    #[serde(default = "default_match_by")]
    pub match_by: Vec<String>,

    /// Severity: LOW, MEDIUM, HIGH or CRITICAL.
    #[arg(long, value_enum, default_value = "LOW")]
    #[serde(default)]
    pub severity: Severity,

    /// Notification method ids invoked on transition to ALARM.
    #[arg(long, value_delimiter = ',')]
    #[serde(default)]
    pub alarm_actions: Vec<String>,

    /// Notification method ids invoked on transition to OK.
    #[arg(long, value_delimiter = ',')]
    #[serde(default)]
    pub ok_actions: Vec<String>,

    /// Notification method ids invoked on transition to UNDETERMINED.
    #[arg(long, value_delimiter = ',')]
    #[serde(default)]
    pub undetermined_actions: Vec<String>,
}

/// Desired state of one notification method.
#[derive(Debug, Clone, Args, Deserialize)]
pub struct NotificationSpec {
    /// The notification method name, used as the natural key for matching.
    #[arg(long)]
    pub name: String,

    /// Whether the notification method should exist.
    #[arg(long, value_enum, default_value = "present")]
    #[serde(default)]
    pub state: State,

    /// Notification type, validated server-side (e.g. EMAIL, WEBHOOK, PAGERDUTY).
    #[arg(long = "type")]
    #[serde(rename = "type")]
    pub method_type: String,

    /// Address the notification is sent to; semantics depend on the type.
    #[arg(long)]
    pub address: String,
}
