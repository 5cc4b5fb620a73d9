//! Report generation flow: start a job, poll it, download the artifact.
//!
//! The controller owns the [`ReportJob`] record. Every update is tagged with
//! the generation of the job that produced it and is applied only while that
//! generation is current, so a superseded or torn-down job can never touch
//! the record again.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::api::ReportApi;
use super::error::{ApiError, ReportError};
use super::job::{ReportJob, DEFAULT_FAILURE_MESSAGE};
use super::poller::{PollOutcome, ReportPoller, POLL_INTERVAL};
use super::sink::ArtifactSink;
use super::types::{JobId, ReportFilter};

/// Default file name for the bulk student report
pub const DEFAULT_REPORT_FILE_NAME: &str = "student_report.csv";

struct Slot {
    generation: u64,
    job: ReportJob,
}

/// Generation-guarded owner of the job record
struct Tracker {
    slot: Mutex<Slot>,
    tx: watch::Sender<ReportJob>,
}

impl Tracker {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(ReportJob::default());
        Self {
            slot: Mutex::new(Slot {
                generation: 0,
                job: ReportJob::default(),
            }),
            tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, slot: &Slot) {
        self.tx.send_replace(slot.job.clone());
    }

    /// Open a new generation in STARTING
    fn begin(&self) -> u64 {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.job.begin();
        self.publish(&slot);
        slot.generation
    }

    /// Apply `f` if `generation` is still current
    fn update(&self, generation: u64, f: impl FnOnce(&mut ReportJob)) -> bool {
        let mut slot = self.lock();
        if slot.generation != generation {
            return false;
        }
        f(&mut slot.job);
        self.publish(&slot);
        true
    }

    /// Run `f` under the lock if `generation` is still current.
    ///
    /// `begin` and `reset` wait for `f` to finish, so a superseded job can
    /// never write after the next generation has started.
    fn with_current<R>(&self, generation: u64, f: impl FnOnce() -> R) -> Option<R> {
        let slot = self.lock();
        (slot.generation == generation).then(f)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    /// Invalidate the current generation and go back to IDLE
    fn reset(&self) {
        let mut slot = self.lock();
        slot.generation += 1;
        slot.job.reset();
        self.publish(&slot);
    }

    fn snapshot(&self) -> ReportJob {
        self.lock().job.clone()
    }
}

/// Drives report jobs for one view or command
pub struct ReportController {
    api: Arc<dyn ReportApi>,
    sink: Arc<dyn ArtifactSink>,
    tracker: Arc<Tracker>,
    driver: Option<JoinHandle<Result<PathBuf, ReportError>>>,
    poll_interval: Duration,
    file_name: String,
}

impl ReportController {
    pub fn new(api: Arc<dyn ReportApi>, sink: Arc<dyn ArtifactSink>) -> Self {
        Self {
            api,
            sink,
            tracker: Arc::new(Tracker::new()),
            driver: None,
            poll_interval: POLL_INTERVAL,
            file_name: DEFAULT_REPORT_FILE_NAME.to_string(),
        }
    }

    /// Override the polling interval (tests use short intervals)
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// File name the finished artifact is saved under
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Receive a snapshot after every change to the job record
    pub fn subscribe(&self) -> watch::Receiver<ReportJob> {
        self.tracker.tx.subscribe()
    }

    pub fn snapshot(&self) -> ReportJob {
        self.tracker.snapshot()
    }

    /// Whether a job is being polled or downloaded
    pub fn is_polling(&self) -> bool {
        self.driver.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start a new report job.
    ///
    /// Any job already in flight is cancelled first. On success the job is
    /// polled in the background and downloaded automatically once READY.
    pub async fn generate(&mut self, filter: ReportFilter) -> Result<JobId, ReportError> {
        self.cancel_driver();
        let generation = self.tracker.begin();
        tracing::info!("Starting report (semester: {:?})", filter.semester);

        let job_id = match self.api.start_report(filter).await {
            Ok(job_id) => job_id,
            Err(e) => {
                tracing::warn!("Failed to start report: {}", e);
                self.tracker.update(generation, ReportJob::start_failed);
                return Err(ReportError::Start(e));
            }
        };

        let assigned = job_id.clone();
        if !self.tracker.update(generation, |job| job.assign(assigned)) {
            return Err(ReportError::Cancelled);
        }
        tracing::info!("Report job {} queued", job_id);

        self.driver = Some(tokio::spawn(drive(
            self.api.clone(),
            self.sink.clone(),
            self.tracker.clone(),
            generation,
            job_id.clone(),
            self.poll_interval,
            self.file_name.clone(),
        )));

        Ok(job_id)
    }

    /// Wait for the current job to finish.
    ///
    /// Returns the final snapshot once the artifact is saved. With nothing in
    /// flight the current snapshot is returned immediately.
    ///
    /// Dropping the returned future leaves the job running and still owned by
    /// the controller, so `teardown` and `generate` can cancel it.
    pub async fn wait(&mut self) -> Result<ReportJob, ReportError> {
        let Some(handle) = self.driver.as_mut() else {
            return Ok(self.snapshot());
        };

        let joined = handle.await;
        // A finished handle must not be polled again
        self.driver = None;

        match joined {
            Ok(Ok(_)) => Ok(self.snapshot()),
            Ok(Err(e)) => Err(e),
            Err(e) if e.is_cancelled() => Err(ReportError::Cancelled),
            Err(e) => {
                tracing::error!("Report driver crashed: {}", e);
                Err(ReportError::Worker(e.to_string()))
            }
        }
    }

    /// Cancel any in-flight job and return to IDLE
    pub fn teardown(&mut self) {
        self.cancel_driver();
        self.tracker.reset();
    }

    fn cancel_driver(&mut self) {
        if let Some(handle) = self.driver.take() {
            handle.abort();
            tracing::debug!("Cancelled in-flight report job");
        }
    }
}

impl Drop for ReportController {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Poll one job to completion, then download its artifact
async fn drive(
    api: Arc<dyn ReportApi>,
    sink: Arc<dyn ArtifactSink>,
    tracker: Arc<Tracker>,
    generation: u64,
    job_id: JobId,
    interval: Duration,
    file_name: String,
) -> Result<PathBuf, ReportError> {
    let status_tracker = tracker.clone();
    let mut poller = ReportPoller::start(api.clone(), job_id.clone(), interval, move |status| {
        status_tracker.update(generation, |job| job.apply_status(status));
    });

    match poller.wait().await {
        PollOutcome::Ready(_) => {}
        PollOutcome::Terminal(status) => {
            let message = status
                .message_text()
                .unwrap_or(DEFAULT_FAILURE_MESSAGE)
                .to_string();
            tracing::warn!("Report job {} ended {}: {}", job_id, status.state, message);
            return Err(ReportError::Terminal {
                state: status.state,
                message,
            });
        }
        PollOutcome::Error(e) => {
            tracker.update(generation, ReportJob::poll_failed);
            return Err(ReportError::Poll(e));
        }
        PollOutcome::Cancelled => return Err(ReportError::Cancelled),
    }

    if !tracker.is_current(generation) {
        return Err(ReportError::Cancelled);
    }

    tracing::info!("Report job {} is ready, downloading", job_id);
    let bytes = match api.download_report(&job_id).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to download report {}: {}", job_id, e);
            tracker.update(generation, ReportJob::download_failed);
            return Err(ReportError::Download(e));
        }
    };

    let save_tracker = tracker.clone();
    let saved = tokio::task::spawn_blocking(move || {
        save_tracker
            .with_current(generation, || sink.save(&file_name, &bytes))
            .transpose()
    })
    .await
    .map_err(|e| ApiError::Worker(e.to_string()))
    .and_then(|r| r.map_err(ApiError::from));

    match saved {
        Ok(None) => {
            tracing::debug!("Report job {} was superseded before saving", job_id);
            Err(ReportError::Cancelled)
        }
        Ok(Some(path)) => {
            let artifact = path.clone();
            tracker.update(generation, |job| job.downloaded(artifact));
            Ok(path)
        }
        Err(e) => {
            tracing::warn!("Failed to save report {}: {}", job_id, e);
            tracker.update(generation, ReportJob::download_failed);
            Err(ReportError::Download(e))
        }
    }
}
