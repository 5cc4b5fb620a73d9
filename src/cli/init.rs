//! Init command implementation

use anyhow::{bail, Context, Result};
use std::path::Path;

use marksheet::Config;

/// Default configuration content for marksheet init
pub const DEFAULT_CONFIG: &str = r#"# Marksheet client configuration
# ==============================

# Backend the client talks to
[server]
base_url = "http://localhost:8080"
connect_timeout_secs = 5
# Report downloads can be large, give reads some headroom
read_timeout_secs = 60

# Where generated reports are saved
[reports]
# download_dir = "/path/to/reports"   # defaults to the current directory
file_name = "student_report.csv"
"#;

/// Write the default configuration.
///
/// Creates ~/.marksheet/config.toml unless `--config` names another path.
pub fn init_command(config_path: Option<&Path>, force: bool) -> Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    marksheet::config::write_file_locked(&config_path, DEFAULT_CONFIG.as_bytes())
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created: {}", config_path.display());

    Ok(())
}
