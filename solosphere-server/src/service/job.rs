//! Job Service
//!
//! Business logic for posting, editing and browsing jobs.

use solosphere_core::deadline;
use solosphere_core::domain::job::Job;
use solosphere_core::dto::ack::{DeleteResult, InsertResult, UpdateResult};
use solosphere_core::dto::job::{CreateJob, JobCount, JobCountParams, JobPatch, JobSearchParams};
use serde_json::Value;
use uuid::Uuid;

use crate::query::{CATEGORY_FIELD, DEADLINE_FIELD, JobQuery, TITLE_FIELD};
use crate::repository::job::{BID_COUNT_FIELD, BUYER_FIELD};
use crate::repository::job_repository;
use crate::service::check_string_field;
use crate::store::{ID_KEY, Store, StoreError};

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Job {0} not found")]
    NotFound(Uuid),

    #[error("{caller} may not list jobs owned by {owner}")]
    Forbidden { owner: String, caller: String },

    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Post a new job
pub async fn create_job(store: &dyn Store, req: CreateJob) -> Result<InsertResult, JobError> {
    let id = job_repository::create(store, req).await?;

    tracing::info!("Job created: {}", id);

    Ok(InsertResult::new(id))
}

/// Get a job by ID
pub async fn get_job(store: &dyn Store, id: Uuid) -> Result<Job, JobError> {
    let job = job_repository::find_by_id(store, id)
        .await?
        .ok_or(JobError::NotFound(id))?;

    Ok(job)
}

/// List the jobs a buyer posted
///
/// `caller` is the identity verified by the authenticator; only the owner
/// may list their own jobs.
pub async fn list_jobs_by_owner(
    store: &dyn Store,
    email: &str,
    caller: &str,
) -> Result<Vec<Job>, JobError> {
    if email != caller {
        return Err(JobError::Forbidden {
            owner: email.to_string(),
            caller: caller.to_string(),
        });
    }

    let jobs = job_repository::find_by_owner(store, email).await?;
    Ok(jobs)
}

/// List all jobs
pub async fn list_all_jobs(store: &dyn Store) -> Result<Vec<Job>, JobError> {
    let jobs = job_repository::list_all(store).await?;
    Ok(jobs)
}

/// Set fields on a job, creating the job if the id is unknown
///
/// Keys absent from the patch keep their stored values.
pub async fn replace_job(
    store: &dyn Store,
    id: Uuid,
    patch: JobPatch,
) -> Result<UpdateResult, JobError> {
    let fields = sanitize_patch(patch)?;
    let outcome = job_repository::upsert(store, id, fields).await?;

    match outcome.upserted_id {
        Some(created) => tracing::info!("Job {} created by upsert", created),
        None => tracing::info!("Job {} updated", id),
    }

    Ok(UpdateResult {
        acknowledged: true,
        matched_count: outcome.matched,
        modified_count: outcome.modified,
        upserted_id: outcome.upserted_id,
    })
}

/// Delete a job; deleting an unknown id succeeds with a zero count
pub async fn delete_job(store: &dyn Store, id: Uuid) -> Result<DeleteResult, JobError> {
    let deleted = job_repository::delete(store, id).await?;

    if deleted == 0 {
        tracing::debug!("Delete of unknown job {} ignored", id);
    } else {
        tracing::info!("Job {} deleted", id);
    }

    Ok(DeleteResult::new(deleted))
}

/// Count one more bid against a job
///
/// A missing job is logged and tolerated: the bid that triggered the
/// increment is the authoritative record.
pub async fn increment_bid_count(store: &dyn Store, id: Uuid) -> Result<(), JobError> {
    let matched = job_repository::increment_bid_count(store, id).await?;

    if !matched {
        tracing::warn!("Bid count not incremented: job {} does not exist", id);
    }

    Ok(())
}

/// One page of jobs matching a search
pub async fn search_jobs(store: &dyn Store, params: JobSearchParams) -> Result<Vec<Job>, JobError> {
    let query = JobQuery::from_params(params);
    tracing::debug!("Searching jobs: {:?}", query);

    let jobs = job_repository::search(store, &query).await?;
    Ok(jobs)
}

/// Total number of jobs matching a search
pub async fn count_jobs(store: &dyn Store, params: JobCountParams) -> Result<JobCount, JobError> {
    let query = JobQuery::for_count(params);
    let count = job_repository::count(store, &query).await?;

    Ok(JobCount { count })
}

// =============================================================================
// Validation
// =============================================================================

/// Drop keys a patch may not touch, type-check the typed fields and
/// normalize the deadline
///
/// Stored jobs must keep decoding as [`Job`], so a value of the wrong type
/// is rejected instead of merged.
fn sanitize_patch(patch: JobPatch) -> Result<serde_json::Map<String, Value>, JobError> {
    let mut fields = patch.into_inner();

    // the id is immutable and the bid count belongs to increment_bid_count
    fields.remove(ID_KEY);
    fields.remove(BID_COUNT_FIELD);

    for key in [TITLE_FIELD, CATEGORY_FIELD] {
        check_string_field(&fields, key).map_err(JobError::InvalidInput)?;
    }

    match fields.get(BUYER_FIELD) {
        None => {}
        Some(Value::Object(buyer)) => {
            check_string_field(buyer, "email")
                .map_err(|e| JobError::InvalidInput(format!("Invalid buyer: {}", e)))?;
        }
        Some(other) => {
            return Err(JobError::InvalidInput(format!(
                "Invalid buyer: expected an object, got {}",
                other
            )));
        }
    }

    if let Some(raw) = fields.get(DEADLINE_FIELD) {
        let normalized = match raw {
            Value::String(s) => deadline::normalize(s)
                .map_err(|e| JobError::InvalidInput(format!("Invalid deadline '{}': {}", s, e)))?,
            other => {
                return Err(JobError::InvalidInput(format!(
                    "Invalid deadline: expected an RFC 3339 string, got {}",
                    other
                )));
            }
        };
        fields.insert(DEADLINE_FIELD.to_string(), Value::String(normalized));
    }

    Ok(fields)
}
