//! Bid Repository
//!
//! Handles all store operations related to bids.

use serde_json::{Map, Value};
use solosphere_core::domain::bid::Bid;
use solosphere_core::dto::bid::CreateBid;
use uuid::Uuid;

use crate::store::{
    Collection, Document, Filter, FindOptions, ID_KEY, Store, StoreError, Update, UpdateOutcome,
};

pub const BIDDER_EMAIL_FIELD: &str = "email";
pub const BUYER_EMAIL_FIELD: &str = "buyer_email";
pub const JOB_ID_FIELD: &str = "jobId";
pub const STATUS_FIELD: &str = "status";

/// Insert a bid unless the bidder already bid on the job
///
/// The (bidder, job) uniqueness is enforced by the store in the same
/// operation, so a collision surfaces as `StoreError::Conflict`.
pub async fn insert(store: &dyn Store, req: CreateBid) -> Result<Uuid, StoreError> {
    let id = Uuid::new_v4();

    let mut fields = match serde_json::to_value(req)? {
        Value::Object(fields) => fields,
        other => {
            return Err(StoreError::Malformed(format!(
                "bid did not serialize to an object: {}",
                other
            )));
        }
    };
    fields.remove(ID_KEY);

    store
        .insert_one(Collection::Bids, Document::new(id, fields))
        .await
}

/// Find all bids placed by one bidder
pub async fn find_by_bidder(store: &dyn Store, email: &str) -> Result<Vec<Bid>, StoreError> {
    find_many(store, &Filter::eq(BIDDER_EMAIL_FIELD, email)).await
}

/// Find all bids placed on jobs owned by one buyer
pub async fn find_by_buyer(store: &dyn Store, buyer_email: &str) -> Result<Vec<Bid>, StoreError> {
    find_many(store, &Filter::eq(BUYER_EMAIL_FIELD, buyer_email)).await
}

/// Merge fields into an existing bid; a missing bid is left missing
pub async fn merge(
    store: &dyn Store,
    id: Uuid,
    fields: Map<String, Value>,
) -> Result<UpdateOutcome, StoreError> {
    store
        .update_one(Collection::Bids, id, &Update::Set(fields), false)
        .await
}

// =============================================================================
// Helper Functions
// =============================================================================

async fn find_many(store: &dyn Store, filter: &Filter) -> Result<Vec<Bid>, StoreError> {
    store
        .find(Collection::Bids, filter, FindOptions::default())
        .await?
        .into_iter()
        .map(Document::decode)
        .collect()
}
