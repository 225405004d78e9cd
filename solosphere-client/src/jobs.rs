//! Job-related API endpoints

use crate::MarketplaceClient;
use crate::error::Result;
use solosphere_core::domain::job::Job;
use solosphere_core::dto::ack::{DeleteResult, InsertResult, UpdateResult};
use solosphere_core::dto::job::{CreateJob, JobCount, JobCountParams, JobPatch, JobSearchParams};
use uuid::Uuid;

impl MarketplaceClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Post a new job
    ///
    /// # Returns
    /// The acknowledgement carrying the new job's id
    pub async fn create_job(&self, req: &CreateJob) -> Result<InsertResult> {
        let url = format!("{}/jobs", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Get a job by ID
    pub async fn get_job(&self, job_id: Uuid) -> Result<Job> {
        let url = format!("{}/job/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Set fields on a job; the server creates the job if the id is unknown
    pub async fn replace_job(&self, job_id: Uuid, patch: &JobPatch) -> Result<UpdateResult> {
        let url = format!("{}/job/{}", self.base_url, job_id);
        let response = self.client.put(&url).json(patch).send().await?;

        self.handle_response(response).await
    }

    /// Delete a job
    pub async fn delete_job(&self, job_id: Uuid) -> Result<DeleteResult> {
        let url = format!("{}/job/{}", self.base_url, job_id);
        let response = self.client.delete(&url).send().await?;

        self.handle_response(response).await
    }

    // =============================================================================
    // Job Listings
    // =============================================================================

    /// List all jobs
    pub async fn list_all_jobs(&self) -> Result<Vec<Job>> {
        let url = format!("{}/jobs", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List the jobs posted by `email`
    ///
    /// Requires a session for the same email (see
    /// [`MarketplaceClient::sign_in`]).
    pub async fn list_my_jobs(&self, email: &str) -> Result<Vec<Job>> {
        let url = self.endpoint(&["jobs", email])?;
        let response = self.client.get(url).send().await?;

        self.handle_response(response).await
    }

    /// Paginated, filtered, sorted job search
    pub async fn search_jobs(&self, params: &JobSearchParams) -> Result<Vec<Job>> {
        let url = format!("{}/allJobs", self.base_url);
        let response = self.client.get(&url).query(params).send().await?;

        self.handle_response(response).await
    }

    /// Count jobs matching a category and search term
    pub async fn count_jobs(&self, params: &JobCountParams) -> Result<u64> {
        let url = format!("{}/jobsCount", self.base_url);
        let response = self.client.get(&url).query(params).send().await?;

        let count: JobCount = self.handle_response(response).await?;
        Ok(count.count)
    }
}
