//! Async seam over the reports API.

use async_trait::async_trait;

use super::client::ReportClient;
use super::error::ApiError;
use super::types::{JobId, ReportFilter, ReportJobStatus, StudentMarksheet};

/// Operations the report flow needs from the backend
#[async_trait]
pub trait ReportApi: Send + Sync + 'static {
    /// Start a bulk report job and return its id
    async fn start_report(&self, filter: ReportFilter) -> Result<JobId, ApiError>;

    /// Read the current status of a job
    async fn job_status(&self, job_id: &JobId) -> Result<ReportJobStatus, ApiError>;

    /// Fetch the finished artifact of a job
    async fn download_report(&self, job_id: &JobId) -> Result<Vec<u8>, ApiError>;

    async fn student_report(
        &self,
        student_id: u64,
        semester: u32,
    ) -> Result<StudentMarksheet, ApiError>;

    async fn download_student_report(
        &self,
        student_id: u64,
        semester: u32,
    ) -> Result<Vec<u8>, ApiError>;
}

/// Run a blocking client call on the blocking pool
async fn blocking<T, F>(client: &ReportClient, call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ReportClient) -> Result<T, ApiError> + Send + 'static,
{
    let client = client.clone();
    tokio::task::spawn_blocking(move || call(&client))
        .await
        .map_err(|e| ApiError::Worker(e.to_string()))?
}

#[async_trait]
impl ReportApi for ReportClient {
    async fn start_report(&self, filter: ReportFilter) -> Result<JobId, ApiError> {
        blocking(self, move |c| c.start_report(&filter)).await
    }

    async fn job_status(&self, job_id: &JobId) -> Result<ReportJobStatus, ApiError> {
        let job_id = job_id.clone();
        blocking(self, move |c| c.job_status(&job_id)).await
    }

    async fn download_report(&self, job_id: &JobId) -> Result<Vec<u8>, ApiError> {
        let job_id = job_id.clone();
        blocking(self, move |c| c.download_report(&job_id)).await
    }

    async fn student_report(
        &self,
        student_id: u64,
        semester: u32,
    ) -> Result<StudentMarksheet, ApiError> {
        blocking(self, move |c| c.student_report(student_id, semester)).await
    }

    async fn download_student_report(
        &self,
        student_id: u64,
        semester: u32,
    ) -> Result<Vec<u8>, ApiError> {
        blocking(self, move |c| c.download_student_report(student_id, semester)).await
    }
}
