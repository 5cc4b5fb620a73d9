//! Destinations for downloaded report artifacts.

use std::path::{Path, PathBuf};

use crate::config::write_file_atomic;

/// Persists downloaded report bytes
pub trait ArtifactSink: Send + Sync + 'static {
    /// Store `bytes` under `file_name` and return where they ended up
    fn save(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf>;
}

/// Saves artifacts into a download directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSink for DirectorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let name = sanitize_file_name(file_name);
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        write_file_atomic(&path, bytes)?;
        tracing::info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

/// Keep only the final path component so a name cannot escape the directory
fn sanitize_file_name(file_name: &str) -> String {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        "report.csv".to_string()
    } else {
        name.to_string()
    }
}
