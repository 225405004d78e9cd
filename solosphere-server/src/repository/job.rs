//! Job Repository
//!
//! Handles all store operations related to jobs.

use serde_json::{Map, Value};
use solosphere_core::domain::job::Job;
use solosphere_core::dto::job::CreateJob;
use uuid::Uuid;

use crate::query::JobQuery;
use crate::store::{
    Collection, Document, Filter, FindOptions, ID_KEY, Store, StoreError, Update, UpdateOutcome,
};

pub const BID_COUNT_FIELD: &str = "bid_count";
pub const BUYER_FIELD: &str = "buyer";
pub const OWNER_EMAIL_FIELD: &str = "buyer.email";

/// Insert a new job with a zero bid count
pub async fn create(store: &dyn Store, req: CreateJob) -> Result<Uuid, StoreError> {
    let id = Uuid::new_v4();

    let mut fields = match serde_json::to_value(req)? {
        Value::Object(fields) => fields,
        other => {
            return Err(StoreError::Malformed(format!(
                "job did not serialize to an object: {}",
                other
            )));
        }
    };
    fields.remove(ID_KEY);
    fields.insert(BID_COUNT_FIELD.to_string(), Value::from(0u64));

    store
        .insert_one(Collection::Jobs, Document::new(id, fields))
        .await
}

/// Find a job by ID
pub async fn find_by_id(store: &dyn Store, id: Uuid) -> Result<Option<Job>, StoreError> {
    store
        .find_one(Collection::Jobs, &Filter::Id(id))
        .await?
        .map(Document::decode)
        .transpose()
}

/// Find jobs posted by one buyer
pub async fn find_by_owner(store: &dyn Store, email: &str) -> Result<Vec<Job>, StoreError> {
    find_many(
        store,
        &Filter::eq(OWNER_EMAIL_FIELD, email),
        FindOptions::default(),
    )
    .await
}

/// List all jobs
pub async fn list_all(store: &dyn Store) -> Result<Vec<Job>, StoreError> {
    find_many(store, &Filter::All, FindOptions::default()).await
}

/// One page of a job search
pub async fn search(store: &dyn Store, query: &JobQuery) -> Result<Vec<Job>, StoreError> {
    find_many(store, &query.filter(), query.options()).await
}

/// Number of jobs matching a search, ignoring its sort and window
pub async fn count(store: &dyn Store, query: &JobQuery) -> Result<u64, StoreError> {
    store
        .count_documents(Collection::Jobs, &query.filter())
        .await
}

/// Set the given fields on a job, creating it under `id` if missing
pub async fn upsert(
    store: &dyn Store,
    id: Uuid,
    fields: Map<String, Value>,
) -> Result<UpdateOutcome, StoreError> {
    store
        .update_one(Collection::Jobs, id, &Update::Set(fields), true)
        .await
}

/// Atomically add one to a job's bid count
///
/// Returns whether a job matched.
pub async fn increment_bid_count(store: &dyn Store, id: Uuid) -> Result<bool, StoreError> {
    let outcome = store
        .update_one(
            Collection::Jobs,
            id,
            &Update::Increment {
                field: BID_COUNT_FIELD,
                by: 1,
            },
            false,
        )
        .await?;

    Ok(outcome.matched > 0)
}

/// Delete a job by ID
pub async fn delete(store: &dyn Store, id: Uuid) -> Result<u64, StoreError> {
    store.delete_one(Collection::Jobs, id).await
}

// =============================================================================
// Helper Functions
// =============================================================================

async fn find_many(
    store: &dyn Store,
    filter: &Filter,
    options: FindOptions,
) -> Result<Vec<Job>, StoreError> {
    store
        .find(Collection::Jobs, filter, options)
        .await?
        .into_iter()
        .map(Document::decode)
        .collect()
}
