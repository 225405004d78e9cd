//! Data Transfer Objects
//!
//! Shapes exchanged between the marketplace server and its clients:
//! create requests, merge patches, search parameters and the store
//! acknowledgements returned by write endpoints.

pub mod ack;
pub mod bid;
pub mod job;
pub mod session;
