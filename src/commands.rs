//! CLI command definitions for marksheet.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default ~/.marksheet/config.toml
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Store the session used for authenticated requests
    Login {
        #[arg(long)]
        email: String,
        /// ADMIN, TEACHER or STUDENT
        #[arg(long)]
        role: String,
        /// Bearer token issued by the portal
        #[arg(long)]
        token: String,
        #[arg(long)]
        department_id: Option<u64>,
        #[arg(long)]
        department_name: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored session
    Whoami {
        /// Print JSON instead of human output
        #[arg(long)]
        json: bool,
    },

    /// Change the department of the stored session
    Department {
        #[arg(long)]
        id: Option<u64>,
        #[arg(long)]
        name: Option<String>,
    },

    /// Generate and download reports
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Generate the bulk student report and download it when ready
    Generate {
        /// Only include this semester
        #[arg(long, short = 's')]
        semester: Option<u32>,
        /// Directory to save the report to (overrides [reports].download_dir)
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
        /// Print status snapshots as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Show the status of a report job once
    Status {
        job_id: String,
        /// Print JSON instead of human output
        #[arg(long)]
        json: bool,
    },
    /// Download the artifact of a finished job
    Download {
        job_id: String,
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },
    /// Show or download one student's marksheet
    Student {
        student_id: u64,
        #[arg(long, short = 's')]
        semester: u32,
        /// Print JSON instead of human output
        #[arg(long)]
        json: bool,
        /// Save the marksheet file instead of printing it
        #[arg(long)]
        download: bool,
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },
}
