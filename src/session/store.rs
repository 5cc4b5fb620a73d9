//! Persistence of the login session.

use std::path::{Path, PathBuf};

use super::{Session, SessionError};
use crate::config::{write_file_locked, Config};

/// Single writer for the stored session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at ~/.marksheet/session.json
    pub fn global() -> Self {
        Self::new(Config::session_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored session, if any
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Read the stored session, failing when nobody is logged in
    pub fn require(&self) -> Result<Session, SessionError> {
        self.load()?.ok_or(SessionError::NotLoggedIn)
    }

    /// Replace the stored session
    pub fn login(&self, session: &Session) -> Result<(), SessionError> {
        let content = serde_json::to_vec_pretty(session)?;
        write_file_locked(&self.path, &content)?;
        tracing::info!("Logged in as {} ({})", session.email, session.role);
        Ok(())
    }

    /// Remove the stored session. Returns false if nobody was logged in.
    pub fn logout(&self) -> Result<bool, SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Change the department of the stored session
    pub fn set_department(
        &self,
        id: Option<u64>,
        name: Option<String>,
    ) -> Result<Session, SessionError> {
        let session = self.require()?.with_department(id, name);
        self.login(&session)?;
        Ok(session)
    }
}
