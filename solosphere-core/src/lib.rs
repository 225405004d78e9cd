//! SoloSphere Core
//!
//! Core types shared by the SoloSphere marketplace server and its clients.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, Bid)
//! - DTOs: Request, query and acknowledgement shapes exchanged over the API
//! - The deadline wire format shared by both sides

pub mod deadline;
pub mod domain;
pub mod dto;
