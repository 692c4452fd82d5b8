//! Notification method resource type and comparison rules.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::params::NotificationSpec;

/// A notification method as returned by the Monasca API.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationMethod {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub method_type: String,
    #[serde(default)]
    pub address: String,
}

/// Whether the remote method already matches the desired state.
/// Compared fields: type and address.
pub fn up_to_date(desired: &NotificationSpec, remote: &NotificationMethod) -> bool {
    desired.method_type == remote.method_type && desired.address == remote.address
}

/// Request body for create and update calls.
pub fn request_body(desired: &NotificationSpec) -> Value {
    json!({
        "name": desired.name,
        "type": desired.method_type,
        "address": desired.address,
    })
}
