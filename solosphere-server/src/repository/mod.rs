//! Repository Module
//!
//! Data access layer for the marketplace.
//! Each repository handles store operations for a specific domain entity.

pub mod bid;
pub mod job;

// Re-export for convenience
pub use bid as bid_repository;
pub use job as job_repository;
