//! Report commands: generate, status, download, student.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use marksheet::report::{
    student_report_file_name, ArtifactSink, DirectorySink, JobId, ReportApi, ReportClient,
    ReportController, ReportError, ReportFilter, ReportJob, StudentMarksheet,
};
use marksheet::{Config, Session, SessionStore};

/// Config, session and an authenticated API handle
fn connect(config_path: Option<&Path>) -> Result<(Config, Session, Arc<dyn ReportApi>)> {
    let config = Config::load(config_path)?;
    let session = SessionStore::global().require()?;
    let client = ReportClient::from_settings(
        &config.server,
        session.bearer_token().map(str::to_string),
    );
    tracing::debug!("Using backend {}", client.base_url());
    let api: Arc<dyn ReportApi> = Arc::new(client);

    Ok((config, session, api))
}

fn download_dir(config: &Config, out: Option<PathBuf>) -> PathBuf {
    out.unwrap_or_else(|| config.download_dir())
}

/// One human-readable line per job snapshot
fn progress_line(job: &ReportJob) -> String {
    let id = job
        .job_id
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!("[{}] job {} {:>3}%  {}", job.phase, id, job.progress, job.message);
    if let Some(path) = &job.artifact {
        line.push_str(&format!(" -> {}", path.display()));
    }
    line
}

fn print_job(job: &ReportJob, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(job)?);
    } else {
        println!("{}", progress_line(job));
    }
    Ok(())
}

/// Start a bulk report, follow its progress and download it when ready
pub async fn generate_command(
    config_path: Option<&Path>,
    semester: Option<u32>,
    out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let (config, session, api) = connect(config_path)?;
    session.require_admin()?;

    let sink = Arc::new(DirectorySink::new(download_dir(&config, out)));
    let mut controller =
        ReportController::new(api, sink).with_file_name(config.reports.file_name.clone());
    let mut updates = controller.subscribe();

    let filter = ReportFilter { semester };
    if let Err(e) = controller.generate(filter).await {
        print_job(&controller.snapshot(), json)?;
        return Err(e).context("Report generation failed");
    }

    let mut last: Option<ReportJob> = None;
    let result = {
        let wait = controller.wait();
        tokio::pin!(wait);
        loop {
            tokio::select! {
                result = &mut wait => break result,
                Ok(()) = updates.changed() => {
                    let job = updates.borrow_and_update().clone();
                    if last.as_ref() != Some(&job) {
                        print_job(&job, json)?;
                        last = Some(job);
                    }
                }
                _ = tokio::signal::ctrl_c() => break Err(ReportError::Cancelled),
            }
        }
    };

    let job = controller.snapshot();
    if last.as_ref() != Some(&job) {
        print_job(&job, json)?;
    }

    let job = result.context("Report generation failed")?;
    if let Some(path) = &job.artifact {
        tracing::info!("Report saved to {}", path.display());
    }
    Ok(())
}

/// Show the current status of a job once
pub async fn status_command(config_path: Option<&Path>, job_id: &str, json: bool) -> Result<()> {
    let (_config, session, api) = connect(config_path)?;
    session.require_admin()?;

    let status = api
        .job_status(&JobId::from(job_id))
        .await
        .with_context(|| format!("Failed to read status of job {}", job_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("Job {}: {} {}%", job_id, status.state, status.progress);
        if let Some(message) = status.message_text() {
            println!("  {}", message);
        }
    }
    Ok(())
}

/// Download the artifact of a job that is already READY
pub async fn download_command(
    config_path: Option<&Path>,
    job_id: &str,
    out: Option<PathBuf>,
) -> Result<()> {
    let (config, session, api) = connect(config_path)?;
    session.require_admin()?;

    let bytes = api
        .download_report(&JobId::from(job_id))
        .await
        .with_context(|| format!("Failed to download report {}", job_id))?;

    let sink = DirectorySink::new(download_dir(&config, out));
    let path = sink
        .save(&config.reports.file_name, &bytes)
        .with_context(|| format!("Failed to save report to {}", sink.dir().display()))?;
    println!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Show or download one student's marksheet for a semester
pub async fn student_command(
    config_path: Option<&Path>,
    student_id: u64,
    semester: u32,
    json: bool,
    download: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let (config, session, api) = connect(config_path)?;
    session.require_staff()?;

    if download {
        let bytes = api
            .download_student_report(student_id, semester)
            .await
            .with_context(|| format!("Failed to download marksheet of student {}", student_id))?;

        let sink = DirectorySink::new(download_dir(&config, out));
        let path = sink.save(&student_report_file_name(student_id, semester), &bytes)?;
        println!("Saved {}", path.display());
        return Ok(());
    }

    let marksheet = api
        .student_report(student_id, semester)
        .await
        .with_context(|| format!("Failed to load marksheet of student {}", student_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&marksheet)?);
    } else {
        print!("{}", render_marksheet(&marksheet, semester));
    }
    Ok(())
}

fn render_marksheet(sheet: &StudentMarksheet, semester: u32) -> String {
    let mut out = format!(
        "{} (#{}) - {}, semester {}\n  {}  born {}\n",
        sheet.name, sheet.id, sheet.department_name, semester, sheet.email, sheet.dob
    );
    if !sheet.course_names.is_empty() {
        out.push_str(&format!("  Courses: {}\n", sheet.course_names.join(", ")));
    }
    for subject in &sheet.subjects {
        out.push_str(&format!(
            "  {:<30} {:>6.1}\n",
            subject.subject_name, subject.marks_obtained
        ));
    }
    out.push_str(&format!(
        "  {:<30} {:>6.1}  ({:.2}%)\n",
        "Total", sheet.total_marks, sheet.percentage
    ));
    out
}
