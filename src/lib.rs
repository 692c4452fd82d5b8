//! Idempotent reconciliation of Monasca monitoring resources.
//!
//! This crate manages two Monasca resource kinds — alarm definitions and
//! notification methods — against a remote Monasca API, authenticated through
//! Keystone. Each invocation lists the existing remote resources, compares
//! them field-by-field to a desired state, and issues at most one
//! create/update/delete call.
//!
//! # Module Structure
//!
//! - [`keystone`] - Keystone session construction and endpoint discovery
//! - [`monasca`] - Typed HTTP bindings for the Monasca v2.0 API
//! - [`reconcile`] - The generic diff-and-decide engine
//! - [`module`] - Invocation entry points producing structured result payloads
//! - [`params`] - Desired-state and connection parameters with validation
//!
//! # Example
//!
//! ```ignore
//! use monasca_reconcile::module;
//! use monasca_reconcile::params::{AlarmSpec, Connection};
//!
//! async fn example(conn: Connection, spec: AlarmSpec) {
//!     let result = module::run_alarm_definition(&conn, &spec, false).await;
//!     println!("{}", result.to_json());
//! }
//! ```

pub mod error;
pub mod keystone;
pub mod module;
pub mod monasca;
pub mod params;
pub mod reconcile;

/// Version injected at compile time via MONASCA_RECONCILE_VERSION env var
/// (set by CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("MONASCA_RECONCILE_VERSION") {
    Some(v) => v,
    None => "dev",
};
