//! Bid DTOs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::bid::default_status;

/// Request to place a bid on a job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBid {
    #[serde(rename = "jobId")]
    pub job_id: Uuid,
    pub email: String,
    #[serde(default)]
    pub buyer_email: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Merge patch applied to a stored bid, typically `{"status": "..."}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BidPatch(pub Map<String, Value>);

impl BidPatch {
    /// Patch that only changes the status
    pub fn status(status: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("status".to_string(), Value::String(status.into()));
        BidPatch(fields)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}
