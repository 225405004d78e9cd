//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A posted job
///
/// Only the fields the marketplace reasons about are typed; everything else
/// the buyer submitted travels in `extra` untouched. Upserts may create jobs
/// with any subset of fields, so every typed field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: Uuid,

    #[serde(default)]
    pub job_title: String,

    #[serde(default)]
    pub job_category: String,

    #[serde(
        default,
        with = "crate::deadline::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub deadline: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<Buyer>,

    /// Number of bids referencing this job, maintained incrementally
    #[serde(default)]
    pub bid_count: u64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    /// Email of the buyer who owns this job, if recorded
    pub fn owner_email(&self) -> Option<&str> {
        self.buyer.as_ref().map(|b| b.email.as_str())
    }
}

/// The buyer who posted a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Buyer {
    #[serde(default)]
    pub email: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Buyer {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }
}
