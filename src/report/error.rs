//! Error types for the report flow

use super::types::JobState;

/// Failure of a single request against the reports API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Server answered with a non-success status
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    /// Connection, DNS or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be interpreted
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking worker running the request died
    #[error("Request worker failed: {0}")]
    Worker(String),
}

impl ApiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Outcome errors of one report generation attempt
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to start report: {0}")]
    Start(#[source] ApiError),

    #[error("Failed to poll report status: {0}")]
    Poll(#[source] ApiError),

    /// Server reported FAILED or NOT_FOUND
    #[error("Report {state}: {message}")]
    Terminal { state: JobState, message: String },

    #[error("Failed to download report: {0}")]
    Download(#[source] ApiError),

    /// The task driving the job died before finishing
    #[error("Report worker failed: {0}")]
    Worker(String),

    /// Superseded by a newer job or torn down
    #[error("Report job was cancelled")]
    Cancelled,
}
