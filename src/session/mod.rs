//! Login session: who is using the client and with which token.
//!
//! A [`Session`] is an immutable value handed to whatever needs identity or
//! authorization data. [`SessionStore`] is the only writer; it persists the
//! session between CLI invocations.

mod store;

pub use store::SessionStore;

use serde::{Deserialize, Serialize};

/// Portal role of the logged-in user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Teacher => "TEACHER",
            Role::Student => "STUDENT",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "TEACHER" => Ok(Role::Teacher),
            "STUDENT" => Ok(Role::Student),
            other => Err(SessionError::UnknownRole(other.to_string())),
        }
    }
}

/// Error type for session handling
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Not logged in (run `marksheet login` first)")]
    NotLoggedIn,

    #[error("This action requires one of [{}], but you are logged in as {actual}", format_roles(.required))]
    Forbidden { required: Vec<Role>, actual: Role },

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid session file: {0}")]
    Parse(#[from] serde_json::Error),
}

fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The logged-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub email: String,
    pub role: Role,
    /// Bearer token sent with every request
    pub token: String,
    #[serde(default)]
    pub department_id: Option<u64>,
    #[serde(default)]
    pub department_name: Option<String>,
    pub logged_in_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    pub fn new(email: impl Into<String>, role: Role, token: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role,
            token: token.into(),
            department_id: None,
            department_name: None,
            logged_in_at: chrono::Utc::now(),
        }
    }

    pub fn with_department(mut self, id: Option<u64>, name: Option<String>) -> Self {
        self.department_id = id;
        self.department_name = name;
        self
    }

    /// Token, if it is non-empty
    pub fn bearer_token(&self) -> Option<&str> {
        Some(self.token.trim()).filter(|t| !t.is_empty())
    }

    /// Fail unless the session role is one of `allowed`
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), SessionError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(SessionError::Forbidden {
                required: allowed.to_vec(),
                actual: self.role,
            })
        }
    }

    /// Bulk reports are admin-only
    pub fn require_admin(&self) -> Result<(), SessionError> {
        self.require_role(&[Role::Admin])
    }

    /// Individual marksheets are open to admins and teachers
    pub fn require_staff(&self) -> Result<(), SessionError> {
        self.require_role(&[Role::Admin, Role::Teacher])
    }
}
