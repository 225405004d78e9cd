//! Bid domain types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Status given to a bid when the submitter does not provide one
pub const DEFAULT_BID_STATUS: &str = "Pending";

/// A freelancer's application to a job
///
/// At most one bid exists per (`email`, `job_id`) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Weak reference to the job; the bid does not own the job's lifecycle
    #[serde(rename = "jobId")]
    pub job_id: Uuid,

    /// Bidder identity
    pub email: String,

    /// Copy of the job owner's email, for reverse lookup
    #[serde(default)]
    pub buyer_email: String,

    #[serde(default = "default_status")]
    pub status: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub(crate) fn default_status() -> String {
    DEFAULT_BID_STATUS.to_string()
}
