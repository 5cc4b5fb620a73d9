//! Configuration loading and management

mod io;

pub use io::{write_file_atomic, write_file_locked};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Report download settings
    #[serde(default)]
    pub reports: ReportSettings,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Base URL of the marksheet backend (without `/admin/reports`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Read timeout; downloads of large reports need some headroom
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_read_timeout_secs() -> u64 {
    60
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
        }
    }
}

/// Report download settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Directory downloaded reports are saved to (defaults to the current directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,

    /// File name for the bulk student report
    #[serde(default = "default_report_file_name")]
    pub file_name: String,
}

fn default_report_file_name() -> String {
    crate::report::DEFAULT_REPORT_FILE_NAME.to_string()
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            download_dir: None,
            file_name: default_report_file_name(),
        }
    }
}

impl Config {
    /// Directory reports are saved to
    pub fn download_dir(&self) -> PathBuf {
        self.reports
            .download_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Path of the stored login session (~/.marksheet/session.json)
    pub fn session_path() -> PathBuf {
        Self::global_config_dir().join("session.json")
    }
}
