use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod cli;
mod commands;

use commands::{Commands, ReportCommands};

#[derive(Parser)]
#[command(name = "marksheet")]
#[command(about = "Student marksheet portal client - generate and download reports")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.marksheet/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init { force } => {
            cli::init::init_command(config_path, force)?;
        }
        Commands::Login {
            email,
            role,
            token,
            department_id,
            department_name,
        } => {
            cli::session::login_command(email, &role, token, department_id, department_name)?;
        }
        Commands::Logout => {
            cli::session::logout_command()?;
        }
        Commands::Whoami { json } => {
            cli::session::whoami_command(json)?;
        }
        Commands::Department { id, name } => {
            cli::session::department_command(id, name)?;
        }
        Commands::Report { command } => match command {
            ReportCommands::Generate {
                semester,
                out,
                json,
            } => {
                cli::report::generate_command(config_path, semester, out, json).await?;
            }
            ReportCommands::Status { job_id, json } => {
                cli::report::status_command(config_path, &job_id, json).await?;
            }
            ReportCommands::Download { job_id, out } => {
                cli::report::download_command(config_path, &job_id, out).await?;
            }
            ReportCommands::Student {
                student_id,
                semester,
                json,
                download,
                out,
            } => {
                cli::report::student_command(config_path, student_id, semester, json, download, out)
                    .await?;
            }
        },
    }

    Ok(())
}
