//! Job API Handlers
//!
//! HTTP endpoints for posting, browsing and maintaining jobs.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use solosphere_core::domain::job::Job;
use solosphere_core::dto::ack::{DeleteResult, InsertResult, UpdateResult};
use solosphere_core::dto::job::{CreateJob, JobCount, JobCountParams, JobPatch, JobSearchParams};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::api::session::CallerIdentity;
use crate::service::job_service;

// =============================================================================
// Job Lifecycle Endpoints
// =============================================================================

/// POST /jobs
/// Post a new job
pub async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJob>,
) -> ApiResult<Json<InsertResult>> {
    tracing::info!("Creating job: {}", req.job_title);

    let ack = job_service::create_job(state.store.as_ref(), req).await?;
    Ok(Json(ack))
}

/// GET /job/{id}
/// Get job details by ID
pub async fn get_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Job>> {
    tracing::debug!("Getting job: {}", id);

    let job = job_service::get_job(state.store.as_ref(), id).await?;
    Ok(Json(job))
}

/// PUT /job/{id}
/// Set fields on a job, creating it when the id is unknown
pub async fn replace_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<JobPatch>,
) -> ApiResult<Json<UpdateResult>> {
    tracing::debug!("Updating job: {}", id);

    let ack = job_service::replace_job(state.store.as_ref(), id, patch).await?;
    Ok(Json(ack))
}

/// DELETE /job/{id}
/// Delete a job
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResult>> {
    tracing::debug!("Deleting job: {}", id);

    let ack = job_service::delete_job(state.store.as_ref(), id).await?;
    Ok(Json(ack))
}

// =============================================================================
// Job Listing Endpoints
// =============================================================================

/// GET /jobs
/// List all jobs
pub async fn list_all_jobs(State(state): State<AppState>) -> ApiResult<Json<Vec<Job>>> {
    tracing::debug!("Listing all jobs");

    let jobs = job_service::list_all_jobs(state.store.as_ref()).await?;
    Ok(Json(jobs))
}

/// GET /jobs/{email}
/// List the jobs posted by the signed-in buyer
pub async fn list_jobs_by_owner(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(email): Path<String>,
) -> ApiResult<Json<Vec<Job>>> {
    tracing::debug!("Listing jobs owned by {}", email);

    let jobs =
        job_service::list_jobs_by_owner(state.store.as_ref(), &email, &caller.0.email).await?;
    Ok(Json(jobs))
}

/// GET /allJobs
/// Paginated, filtered, sorted job search
pub async fn search_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobSearchParams>,
) -> ApiResult<Json<Vec<Job>>> {
    tracing::debug!("Searching jobs: {:?}", params);

    let jobs = job_service::search_jobs(state.store.as_ref(), params).await?;
    Ok(Json(jobs))
}

/// GET /jobsCount
/// Count jobs matching a search
pub async fn count_jobs(
    State(state): State<AppState>,
    Query(params): Query<JobCountParams>,
) -> ApiResult<Json<JobCount>> {
    let count = job_service::count_jobs(state.store.as_ref(), params).await?;
    Ok(Json(count))
}
