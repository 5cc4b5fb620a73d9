//! Asynchronous report generation against the marksheet backend.
//!
//! The flow is: start a job on the server, poll its status once a second,
//! and download the CSV artifact automatically when it becomes READY.

mod api;
mod client;
mod controller;
mod error;
mod job;
mod poller;
mod sink;
mod types;

pub use api::ReportApi;
pub use client::ReportClient;
pub use controller::{ReportController, DEFAULT_REPORT_FILE_NAME};
pub use error::{ApiError, ReportError};
pub use job::{
    JobRef, Phase, ReportJob, DEFAULT_FAILURE_MESSAGE, MSG_DOWNLOADED, MSG_DOWNLOAD_FAILED,
    MSG_POLL_FAILED, MSG_QUEUED, MSG_STARTING, MSG_START_FAILED,
};
pub use poller::{PollOutcome, ReportPoller, POLL_INTERVAL};
pub use sink::{ArtifactSink, DirectorySink};
pub use types::{JobId, JobState, ReportFilter, ReportJobStatus, StudentMarksheet, SubjectMarks};

/// File name for an individual student's downloaded marksheet
pub fn student_report_file_name(student_id: u64, semester: u32) -> String {
    format!("student_{student_id}_sem{semester}_report.csv")
}
