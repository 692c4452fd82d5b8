//! Alarm definition resource type and comparison rules.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::params::AlarmSpec;

/// An alarm definition as returned by the Monasca API.
#[derive(Debug, Clone, Deserialize)]
pub struct AlarmDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub match_by: Vec<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub alarm_actions: Vec<String>,
    #[serde(default)]
    pub ok_actions: Vec<String>,
    #[serde(default)]
    pub undetermined_actions: Vec<String>,
}

/// Whether the remote definition already matches the desired state.
///
/// Only the expression and the three action lists take part in the
/// comparison. `description`, `match_by` and `severity` are sent on update
/// but never compared, so changing them alone does not trigger an update.
pub fn up_to_date(desired: &AlarmSpec, remote: &AlarmDefinition) -> bool {
    desired.expression.as_deref().unwrap_or_default() == remote.expression
        && desired.alarm_actions == remote.alarm_actions
        && desired.ok_actions == remote.ok_actions
        && desired.undetermined_actions == remote.undetermined_actions
}

/// Request body for create and patch calls.
pub fn request_body(desired: &AlarmSpec) -> Value {
    json!({
        "name": desired.name,
        "description": desired.description,
        "expression": desired.expression,
        "match_by": desired.match_by,
        "severity": desired.severity,
        "alarm_actions": desired.alarm_actions,
        "ok_actions": desired.ok_actions,
        "undetermined_actions": desired.undetermined_actions,
    })
}
