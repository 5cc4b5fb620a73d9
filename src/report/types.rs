use serde::{Deserialize, Serialize};

/// Opaque, server-assigned report job identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Server-reported state of a report job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    /// Job is queued on the server
    Pending,
    /// Job is being generated
    Running,
    /// Artifact can be downloaded
    Ready,
    /// Generation failed on the server
    Failed,
    /// The server does not know this job id
    NotFound,
}

impl JobState {
    /// No further transitions happen after a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Ready | JobState::Failed | JobState::NotFound)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Ready => "READY",
            JobState::Failed => "FAILED",
            JobState::NotFound => "NOT_FOUND",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status payload returned by the status endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportJobStatus {
    #[serde(default)]
    pub job_id: Option<JobId>,
    #[serde(default)]
    pub progress: u32,
    pub state: JobState,
    #[serde(default)]
    pub message: Option<String>,
}

impl ReportJobStatus {
    /// The server message, if it carries any text
    pub fn message_text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Narrows the scope of a bulk report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub semester: Option<u32>,
}

impl ReportFilter {
    pub fn semester(semester: u32) -> Self {
        Self {
            semester: Some(semester),
        }
    }
}

/// Marks obtained in one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectMarks {
    #[serde(default)]
    pub subject_id: Option<u64>,
    pub subject_name: String,
    pub marks_obtained: f64,
}

/// A single student's marksheet for one semester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentMarksheet {
    pub id: u64,
    pub name: String,
    pub department_name: String,
    pub email: String,
    pub dob: String,
    #[serde(default)]
    pub course_names: Vec<String>,
    pub total_marks: f64,
    pub percentage: f64,
    #[serde(default)]
    pub subjects: Vec<SubjectMarks>,
}
