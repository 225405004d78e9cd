//! Store acknowledgements
//!
//! Write endpoints answer with the same acknowledgement shapes a document
//! store driver reports, so browser clients can keep checking
//! `insertedId` / `deletedCount`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

impl InsertResult {
    pub fn new(inserted_id: Uuid) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ack_field_names() {
        let id = Uuid::new_v4();
        assert_eq!(
            serde_json::to_value(InsertResult::new(id)).unwrap(),
            json!({ "acknowledged": true, "insertedId": id.to_string() })
        );
        assert_eq!(
            serde_json::to_value(DeleteResult::new(0)).unwrap(),
            json!({ "acknowledged": true, "deletedCount": 0 })
        );
    }
}
