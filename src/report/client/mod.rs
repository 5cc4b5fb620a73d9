//! Blocking HTTP client for the reports API.
//!
//! Async callers go through [`ReportApi`](crate::report::ReportApi), which
//! moves every call onto the blocking thread pool.

mod http;

#[cfg(test)]
mod tests;

use std::time::Duration;

use super::error::ApiError;
use super::types::{JobId, ReportFilter, ReportJobStatus, StudentMarksheet};
use crate::config::ServerSettings;
use http::{encode_url_path_segment, map_ureq_error, read_bytes, read_json, read_text, with_auth};

/// Default backend URL
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Report client bound to one backend and one bearer token
#[derive(Clone)]
pub struct ReportClient {
    base_url: String,
    token: Option<String>,
    agent: ureq::Agent,
}

impl ReportClient {
    /// Create a client for the default local backend
    pub fn new(token: Option<String>) -> Self {
        Self::with_url(DEFAULT_BASE_URL, token)
    }

    /// Create a client for a custom backend URL
    pub fn with_url(base_url: impl Into<String>, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5))
            .timeout_read(Duration::from_secs(60))
            .build();

        Self::from_parts(base_url.into(), token, agent)
    }

    /// Create a client from the `[server]` config section
    pub fn from_settings(settings: &ServerSettings, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(settings.connect_timeout_secs))
            .timeout_read(Duration::from_secs(settings.read_timeout_secs))
            .build();

        Self::from_parts(settings.base_url.clone(), token, agent)
    }

    fn from_parts(base_url: String, token: Option<String>, agent: ureq::Agent) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn reports_url(&self, path: &str) -> String {
        format!("{}/admin/reports{}", self.base_url, path)
    }

    fn get(&self, url: &str) -> ureq::Request {
        with_auth(self.agent.get(url), self.token.as_deref())
    }

    /// Ask the server to start a bulk student report
    pub fn start_report(&self, filter: &ReportFilter) -> Result<JobId, ApiError> {
        let url = self.reports_url("/students/start");
        let mut req = with_auth(self.agent.post(&url), self.token.as_deref());
        if let Some(semester) = filter.semester {
            req = req.query("semester", &semester.to_string());
        }

        let resp = req.call().map_err(map_ureq_error)?;
        let body = read_text(resp)?;
        let job_id = body.trim();
        if job_id.is_empty() {
            return Err(ApiError::Decode("server returned an empty job id".to_string()));
        }

        tracing::debug!("Report job {} accepted by {}", job_id, self.base_url);
        Ok(JobId::new(job_id))
    }

    /// Fetch the current status of a report job
    pub fn job_status(&self, job_id: &JobId) -> Result<ReportJobStatus, ApiError> {
        let url = self.reports_url(&format!(
            "/students/status/{}",
            encode_url_path_segment(job_id.as_str())
        ));
        let resp = self.get(&url).call().map_err(map_ureq_error)?;
        read_json(resp)
    }

    /// Download the finished report artifact
    pub fn download_report(&self, job_id: &JobId) -> Result<Vec<u8>, ApiError> {
        let url = self.reports_url(&format!(
            "/students/download/{}",
            encode_url_path_segment(job_id.as_str())
        ));
        let resp = self.get(&url).call().map_err(map_ureq_error)?;
        read_bytes(resp)
    }

    /// Fetch one student's marksheet for a semester
    pub fn student_report(
        &self,
        student_id: u64,
        semester: u32,
    ) -> Result<StudentMarksheet, ApiError> {
        let url = self.reports_url(&format!("/{student_id}"));
        let resp = self
            .get(&url)
            .query("semester", &semester.to_string())
            .call()
            .map_err(map_ureq_error)?;
        read_json(resp)
    }

    /// Download one student's marksheet as a file
    pub fn download_student_report(
        &self,
        student_id: u64,
        semester: u32,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.reports_url(&format!("/download/{student_id}"));
        let resp = self
            .get(&url)
            .query("semester", &semester.to_string())
            .call()
            .map_err(map_ureq_error)?;
        read_bytes(resp)
    }
}

impl std::fmt::Debug for ReportClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}
