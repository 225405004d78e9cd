//! Core domain types
//!
//! Jobs and bids are independent top-level records. A bid refers to its job
//! by id only; neither record owns the other's storage.

pub mod bid;
pub mod job;
