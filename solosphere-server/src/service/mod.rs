//! Service Module
//!
//! Business logic layer for the marketplace.
//! Services orchestrate between repositories and contain domain logic.

pub mod bid;
pub mod job;

// Re-export for convenience
pub use bid as bid_service;
pub use job as job_service;

use serde_json::{Map, Value};

/// A patch key that must hold a string when present
pub(crate) fn check_string_field(fields: &Map<String, Value>, key: &str) -> Result<(), String> {
    match fields.get(key) {
        None | Some(Value::String(_)) => Ok(()),
        Some(other) => Err(format!("Invalid {}: expected a string, got {}", key, other)),
    }
}
