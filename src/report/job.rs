//! Client-side record of the report job being generated.

use std::path::PathBuf;

use serde::Serialize;

use super::types::{JobId, JobState, ReportJobStatus};

/// Message shown when a terminal failure carries no text
pub const DEFAULT_FAILURE_MESSAGE: &str = "Report failed";

pub const MSG_STARTING: &str = "Starting report...";
pub const MSG_QUEUED: &str = "Report queued...";
pub const MSG_START_FAILED: &str = "Error starting report";
pub const MSG_POLL_FAILED: &str = "Error polling report status";
pub const MSG_DOWNLOADED: &str = "Report downloaded";
pub const MSG_DOWNLOAD_FAILED: &str = "Error downloading report";

/// Reference to the job a controller is tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRef {
    /// Start request issued, no id assigned yet
    Pending,
    Assigned(JobId),
}

impl Serialize for JobRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JobRef::Pending => serializer.serialize_str(Self::PENDING),
            JobRef::Assigned(id) => serializer.serialize_str(id.as_str()),
        }
    }
}

impl JobRef {
    /// Sentinel rendered while waiting for the server
    pub const PENDING: &'static str = "pending";

    pub fn assigned(&self) -> Option<&JobId> {
        match self {
            JobRef::Pending => None,
            JobRef::Assigned(id) => Some(id),
        }
    }
}

impl std::fmt::Display for JobRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobRef::Pending => f.write_str(Self::PENDING),
            JobRef::Assigned(id) => write!(f, "{}", id),
        }
    }
}

/// Controller phase of the report flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Starting,
    Polling,
    Ready,
    Failed,
    NotFound,
}

impl Phase {
    /// A start request or poller is outstanding
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Starting | Phase::Polling)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Idle => "idle",
            Phase::Starting => "starting",
            Phase::Polling => "polling",
            Phase::Ready => "ready",
            Phase::Failed => "failed",
            Phase::NotFound => "not_found",
        };
        f.write_str(s)
    }
}

/// Snapshot of the tracked report job
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportJob {
    pub job_id: Option<JobRef>,
    pub phase: Phase,
    pub state: Option<JobState>,
    pub progress: u32,
    pub message: String,
    /// Where the downloaded artifact was saved
    pub artifact: Option<PathBuf>,
}

impl ReportJob {
    /// Enter STARTING with the pending sentinel
    pub fn begin(&mut self) {
        *self = ReportJob {
            job_id: Some(JobRef::Pending),
            phase: Phase::Starting,
            state: Some(JobState::Pending),
            progress: 0,
            message: MSG_STARTING.to_string(),
            artifact: None,
        };
    }

    /// STARTING -> POLLING once the server assigned an id
    pub fn assign(&mut self, job_id: JobId) {
        self.job_id = Some(JobRef::Assigned(job_id));
        self.phase = Phase::Polling;
        self.message = MSG_QUEUED.to_string();
    }

    /// STARTING -> IDLE, the sentinel is cleared
    pub fn start_failed(&mut self) {
        self.job_id = None;
        self.phase = Phase::Idle;
        self.state = None;
        self.progress = 0;
        self.message = MSG_START_FAILED.to_string();
    }

    /// Replace progress, state and message from a poll response
    pub fn apply_status(&mut self, status: &ReportJobStatus) {
        self.progress = status.progress;
        self.state = Some(status.state);
        self.message = status.message.clone().unwrap_or_default();
        match status.state {
            JobState::Pending | JobState::Running => {}
            JobState::Ready => self.phase = Phase::Ready,
            JobState::Failed | JobState::NotFound => {
                self.phase = if status.state == JobState::Failed {
                    Phase::Failed
                } else {
                    Phase::NotFound
                };
                self.message = status
                    .message_text()
                    .unwrap_or(DEFAULT_FAILURE_MESSAGE)
                    .to_string();
            }
        }
    }

    /// Polling stopped on a transport error
    pub fn poll_failed(&mut self) {
        self.phase = Phase::Idle;
        self.message = MSG_POLL_FAILED.to_string();
    }

    pub fn downloaded(&mut self, path: PathBuf) {
        self.artifact = Some(path);
        self.message = MSG_DOWNLOADED.to_string();
    }

    /// Download failure leaves the job READY
    pub fn download_failed(&mut self) {
        self.message = MSG_DOWNLOAD_FAILED.to_string();
    }

    /// Back to IDLE with nothing tracked
    pub fn reset(&mut self) {
        *self = ReportJob::default();
    }

    pub fn assigned_id(&self) -> Option<&JobId> {
        self.job_id.as_ref().and_then(JobRef::assigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: JobState, progress: u32, message: Option<&str>) -> ReportJobStatus {
        ReportJobStatus {
            job_id: Some(JobId::from("J1")),
            progress,
            state,
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn test_begin_sets_pending_sentinel() {
        let mut job = ReportJob::default();
        job.begin();

        assert_eq!(job.job_id, Some(JobRef::Pending));
        assert_eq!(job.phase, Phase::Starting);
        assert_eq!(job.job_id.as_ref().unwrap().to_string(), "pending");
        assert_eq!(job.assigned_id(), None);
        assert_eq!(job.message, MSG_STARTING);
    }

    #[test]
    fn test_start_failure_clears_sentinel() {
        let mut job = ReportJob::default();
        job.begin();
        job.start_failed();

        assert_eq!(job.job_id, None);
        assert_eq!(job.phase, Phase::Idle);
        assert_eq!(job.message, MSG_START_FAILED);
    }

    #[test]
    fn test_running_status_keeps_polling() {
        let mut job = ReportJob::default();
        job.begin();
        job.assign(JobId::from("J1"));
        job.apply_status(&status(JobState::Running, 40, Some("Processing")));

        assert_eq!(job.phase, Phase::Polling);
        assert_eq!(job.progress, 40);
        assert_eq!(job.state, Some(JobState::Running));
        assert_eq!(job.message, "Processing");
        assert_eq!(job.assigned_id(), Some(&JobId::from("J1")));
    }

    #[test]
    fn test_failed_status_uses_server_message() {
        let mut job = ReportJob::default();
        job.assign(JobId::from("J2"));
        job.apply_status(&status(JobState::Failed, 10, Some("disk full")));

        assert_eq!(job.phase, Phase::Failed);
        assert_eq!(job.message, "disk full");
    }

    #[test]
    fn test_not_found_without_message_uses_default() {
        let mut job = ReportJob::default();
        job.assign(JobId::from("J3"));
        job.apply_status(&status(JobState::NotFound, 0, None));

        assert_eq!(job.phase, Phase::NotFound);
        assert_eq!(job.message, DEFAULT_FAILURE_MESSAGE);
    }

    #[test]
    fn test_download_failure_keeps_ready() {
        let mut job = ReportJob::default();
        job.assign(JobId::from("J4"));
        job.apply_status(&status(JobState::Ready, 100, Some("done")));
        job.download_failed();

        assert_eq!(job.phase, Phase::Ready);
        assert_eq!(job.message, MSG_DOWNLOAD_FAILED);
        assert_eq!(job.artifact, None);
    }

    #[test]
    fn test_pending_sentinel_serializes_as_string() {
        let json = serde_json::to_value(JobRef::Pending).unwrap();
        assert_eq!(json, serde_json::json!("pending"));
        let json = serde_json::to_value(JobRef::Assigned(JobId::from("J9"))).unwrap();
        assert_eq!(json, serde_json::json!("J9"));
    }
}
