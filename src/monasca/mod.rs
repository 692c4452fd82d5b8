//! Monasca API interaction module.
//!
//! - [`http`] - HTTP utilities for REST API calls
//! - [`client`] - Typed client and per-kind resource bindings
//! - [`alarm`] - Alarm definition type and comparison rules
//! - [`notification`] - Notification method type and comparison rules

pub mod alarm;
pub mod client;
pub mod http;
pub mod notification;
