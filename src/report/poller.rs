//! Fixed-interval status polling for one report job.
//!
//! A [`ReportPoller`] is created per job and owns the task that polls it.
//! Stopping (or dropping) the poller cancels the task; a status response that
//! arrives after cancellation is discarded and never reaches the callback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::api::ReportApi;
use super::error::ApiError;
use super::types::{JobId, JobState, ReportJobStatus};

/// Interval between status requests
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// How a polling loop ended
#[derive(Debug)]
pub enum PollOutcome {
    /// Job reached READY
    Ready(ReportJobStatus),
    /// Job reached FAILED or NOT_FOUND
    Terminal(ReportJobStatus),
    /// A status request failed; polling does not retry
    Error(ApiError),
    /// Stopped before reaching a terminal state
    Cancelled,
}

/// Polls the status of one job until it reaches a terminal state
pub struct ReportPoller {
    job_id: JobId,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<PollOutcome>>,
}

impl ReportPoller {
    /// Start polling `job_id` every `interval`.
    ///
    /// `on_status` sees every accepted status response, including the
    /// terminal one. The first request is sent one interval after start.
    pub fn start<F>(
        api: Arc<dyn ReportApi>,
        job_id: JobId,
        interval: Duration,
        on_status: F,
    ) -> Self
    where
        F: FnMut(&ReportJobStatus) + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(poll_loop(
            api,
            job_id.clone(),
            interval,
            cancelled.clone(),
            on_status,
        ));

        tracing::debug!("Polling report job {} every {:?}", job_id, interval);

        Self {
            job_id,
            cancelled,
            handle: Some(handle),
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Cancel polling. Idempotent.
    pub fn stop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Stopped polling report job {}", self.job_id);
        }
    }

    /// Whether the polling task is still alive
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Wait for the loop to end
    pub async fn wait(&mut self) -> PollOutcome {
        let Some(handle) = self.handle.take() else {
            return PollOutcome::Cancelled;
        };

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => PollOutcome::Cancelled,
            Err(e) => PollOutcome::Error(ApiError::Worker(e.to_string())),
        }
    }
}

impl Drop for ReportPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop<F>(
    api: Arc<dyn ReportApi>,
    job_id: JobId,
    interval: Duration,
    cancelled: Arc<AtomicBool>,
    mut on_status: F,
) -> PollOutcome
where
    F: FnMut(&ReportJobStatus) + Send + 'static,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    // A slow response delays the next request instead of stacking ticks
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if cancelled.load(Ordering::SeqCst) {
            return PollOutcome::Cancelled;
        }

        let result = api.job_status(&job_id).await;
        if cancelled.load(Ordering::SeqCst) {
            return PollOutcome::Cancelled;
        }

        let status = match result {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!("Polling report job {} failed: {}", job_id, e);
                return PollOutcome::Error(e);
            }
        };

        if let Some(reported) = &status.job_id {
            if reported != &job_id {
                tracing::warn!(
                    "Ignoring status for job {} while polling job {}",
                    reported,
                    job_id
                );
                continue;
            }
        }

        tracing::debug!(
            "Report job {}: {} {}%",
            job_id,
            status.state,
            status.progress
        );
        on_status(&status);

        match status.state {
            JobState::Pending | JobState::Running => {}
            JobState::Ready => return PollOutcome::Ready(status),
            JobState::Failed | JobState::NotFound => return PollOutcome::Terminal(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::{ReportFilter, StudentMarksheet};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    const FAST: Duration = Duration::from_millis(10);

    /// Answers status requests from a script, then repeats RUNNING
    struct ScriptedStatus {
        script: Mutex<VecDeque<Result<ReportJobStatus, ApiError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedStatus {
        fn new(script: Vec<Result<ReportJobStatus, ApiError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn status(job: &str, state: JobState, progress: u32) -> ReportJobStatus {
        ReportJobStatus {
            job_id: Some(JobId::from(job)),
            progress,
            state,
            message: None,
        }
    }

    #[async_trait]
    impl ReportApi for ScriptedStatus {
        async fn start_report(&self, _filter: ReportFilter) -> Result<JobId, ApiError> {
            unreachable!("poller never starts jobs")
        }

        async fn job_status(&self, job_id: &JobId) -> Result<ReportJobStatus, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(status(job_id.as_str(), JobState::Running, 1)))
        }

        async fn download_report(&self, _job_id: &JobId) -> Result<Vec<u8>, ApiError> {
            unreachable!("poller never downloads")
        }

        async fn student_report(
            &self,
            _student_id: u64,
            _semester: u32,
        ) -> Result<StudentMarksheet, ApiError> {
            unreachable!()
        }

        async fn download_student_report(
            &self,
            _student_id: u64,
            _semester: u32,
        ) -> Result<Vec<u8>, ApiError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_polls_until_ready() {
        let api = ScriptedStatus::new(vec![
            Ok(status("J1", JobState::Pending, 0)),
            Ok(status("J1", JobState::Running, 40)),
            Ok(status("J1", JobState::Ready, 100)),
        ]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = seen.clone();

        let mut poller = ReportPoller::start(api.clone(), JobId::from("J1"), FAST, move |s| {
            seen_cb.lock().unwrap().push(s.progress);
        });
        let outcome = poller.wait().await;

        assert!(matches!(outcome, PollOutcome::Ready(ref s) if s.progress == 100));
        assert_eq!(*seen.lock().unwrap(), vec![0, 40, 100]);
        assert_eq!(api.calls(), 3);
    }

    #[tokio::test]
    async fn test_failed_state_stops_polling() {
        let api = ScriptedStatus::new(vec![Ok(ReportJobStatus {
            message: Some("disk full".to_string()),
            ..status("J2", JobState::Failed, 10)
        })]);

        let mut poller = ReportPoller::start(api.clone(), JobId::from("J2"), FAST, |_| {});
        let outcome = poller.wait().await;
        assert!(matches!(outcome, PollOutcome::Terminal(ref s) if s.state == JobState::Failed));

        tokio::time::sleep(FAST * 5).await;
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_stops_without_retry() {
        let api = ScriptedStatus::new(vec![Err(ApiError::Transport("connection refused".into()))]);

        let mut poller = ReportPoller::start(api.clone(), JobId::from("J3"), FAST, |_| {});
        let outcome = poller.wait().await;
        assert!(matches!(outcome, PollOutcome::Error(ApiError::Transport(_))));

        tokio::time::sleep(FAST * 5).await;
        assert_eq!(api.calls(), 1);
    }

    #[tokio::test]
    async fn test_status_for_other_job_is_ignored() {
        let api = ScriptedStatus::new(vec![
            Ok(status("OTHER", JobState::Ready, 100)),
            Ok(status("J4", JobState::Ready, 100)),
        ]);
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_cb = seen.clone();

        let mut poller = ReportPoller::start(api.clone(), JobId::from("J4"), FAST, move |_| {
            seen_cb.fetch_add(1, Ordering::SeqCst);
        });
        let outcome = poller.wait().await;

        assert!(matches!(
            outcome,
            PollOutcome::Ready(ref s) if s.job_id == Some(JobId::from("J4"))
        ));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test]
    async fn test_stop_cancels_polling() {
        let api = ScriptedStatus::new(Vec::new());
        let mut poller = ReportPoller::start(api.clone(), JobId::from("J5"), FAST, |_| {});
        assert_eq!(poller.job_id().as_str(), "J5");
        assert!(poller.is_running());

        tokio::time::sleep(FAST * 3).await;
        poller.stop();
        assert!(!poller.is_running());
        let calls_at_stop = api.calls();

        tokio::time::sleep(FAST * 5).await;
        assert_eq!(api.calls(), calls_at_stop);
        assert!(matches!(poller.wait().await, PollOutcome::Cancelled));
    }

    #[tokio::test]
    async fn test_drop_cancels_polling() {
        let api = ScriptedStatus::new(Vec::new());
        let poller = ReportPoller::start(api.clone(), JobId::from("J6"), FAST, |_| {});
        drop(poller);

        tokio::time::sleep(FAST * 5).await;
        assert_eq!(api.calls(), 0);
    }
}
