//! Fixed-interval status polling for remote generation tasks.

use super::task::{GenerationTask, TaskStatus};
use crate::error::{Result, StudyreelError};
use crate::provider::VideoProvider;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Polling cadence.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Time between the end of one status query and the start of the next.
    pub interval: Duration,
}

impl PollConfig {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

/// Drives a single task to a terminal state by querying its status.
///
/// Queries are strictly sequential. Each observation is handed to the progress
/// callback before it is evaluated, and the loop stops on completion, failure,
/// deadline or cancellation, each reported as a distinct outcome.
pub struct StatusPoller<'a> {
    provider: &'a dyn VideoProvider,
    config: PollConfig,
    cancel: CancellationToken,
}

impl<'a> StatusPoller<'a> {
    pub fn new(provider: &'a dyn VideoProvider, config: PollConfig) -> Self {
        Self {
            provider,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop polling when `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Poll `task_id` until it completes with a file reference, fails, or `max_wait` runs out.
    ///
    /// Transient query errors are logged and polling carries on; they still count
    /// against `max_wait`. Any other query error ends the loop immediately.
    #[instrument(skip(self, on_progress), fields(interval_ms = self.config.interval.as_millis() as u64))]
    pub async fn wait_for_completion<F>(
        &self,
        task_id: &str,
        mut on_progress: F,
        max_wait: Duration,
    ) -> Result<GenerationTask>
    where
        F: FnMut(&GenerationTask),
    {
        let started = Instant::now();
        let deadline = started + max_wait;
        let mut polls = 0u32;

        loop {
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(task_id, polls));
            }

            polls += 1;
            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(self.cancelled(task_id, polls)),
                result = self.provider.query_task(task_id) => result,
            };

            match outcome {
                Ok(task) => {
                    on_progress(&task);

                    match task.status {
                        TaskStatus::Completed if task.usable_file_ref().is_some() => {
                            info!(
                                "Task {} completed after {} polls ({:.1}s)",
                                task_id,
                                polls,
                                started.elapsed().as_secs_f64()
                            );
                            return Ok(task);
                        }
                        TaskStatus::Completed => {
                            warn!("Task {} reports completion without a file reference", task_id);
                        }
                        TaskStatus::Failed => {
                            return Err(StudyreelError::ProviderFailure {
                                task_id: task_id.to_string(),
                                message: task
                                    .error
                                    .unwrap_or_else(|| "provider gave no reason".to_string()),
                            });
                        }
                        TaskStatus::Pending | TaskStatus::Processing | TaskStatus::Unknown => {
                            debug!("Task {} still {} (poll {})", task_id, task.raw_status, polls);
                        }
                    }
                }
                Err(e) if e.is_transient() => {
                    warn!("Status query {} for task {} failed, retrying: {}", polls, task_id, e);
                }
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(StudyreelError::Timeout {
                    task_id: task_id.to_string(),
                    waited: now - started,
                });
            }

            let nap = self.config.interval.min(deadline - now);
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(self.cancelled(task_id, polls)),
                _ = tokio::time::sleep(nap) => {}
            }
        }
    }

    fn cancelled(&self, task_id: &str, polls: u32) -> StudyreelError {
        info!("Polling for task {} cancelled after {} polls", task_id, polls);
        StudyreelError::Cancelled {
            task_id: task_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::fake::{ScriptedProvider, Step};

    const INTERVAL: Duration = Duration::from_millis(30);

    fn poller(provider: &ScriptedProvider) -> StatusPoller<'_> {
        StatusPoller::new(provider, PollConfig::new(INTERVAL))
    }

    #[tokio::test]
    async fn test_processing_then_success_polls_n_plus_one_times() {
        let n = 3;
        let mut steps = vec![Step::Status("Processing", None); n];
        steps.push(Step::Status("Success", Some("file-1")));
        let provider = ScriptedProvider::new("t1", steps);

        let task = poller(&provider)
            .wait_for_completion("t1", |_| {}, Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.file_ref.as_deref(), Some("file-1"));
        assert_eq!(provider.query_count(), n + 1);

        let times = provider.query_times();
        for pair in times.windows(2) {
            assert!(pair[1] - pair[0] >= INTERVAL, "polled without sleeping the interval");
        }
    }

    #[tokio::test]
    async fn test_never_finishing_times_out_after_max_wait() {
        let provider = ScriptedProvider::new("t1", vec![Step::Status("Processing", None)]);
        let max_wait = INTERVAL * 5;

        let started = std::time::Instant::now();
        let err = poller(&provider)
            .wait_for_completion("t1", |_| {}, max_wait)
            .await
            .unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, StudyreelError::Timeout { .. }));
        assert!(elapsed >= max_wait, "timed out early after {elapsed:?}");
        assert!(elapsed < max_wait + Duration::from_secs(2), "overran: {elapsed:?}");
        let polls = provider.query_count();
        assert!((5..=7).contains(&polls), "unexpected poll count {polls}");
    }

    #[tokio::test]
    async fn test_failed_status_is_provider_failure() {
        let provider = ScriptedProvider::new(
            "t1",
            vec![Step::Status("Processing", None), Step::Failed("content rejected")],
        );

        let err = poller(&provider)
            .wait_for_completion("t1", |_| {}, Duration::from_secs(10))
            .await
            .unwrap_err();

        match err {
            StudyreelError::ProviderFailure { task_id, message } => {
                assert_eq!(task_id, "t1");
                assert_eq!(message, "content rejected");
            }
            other => panic!("expected ProviderFailure, got {other:?}"),
        }
        assert_eq!(provider.query_count(), 2);
    }

    #[tokio::test]
    async fn test_progress_callback_does_not_change_outcome() {
        let script = || {
            vec![
                Step::Status("Queueing", None),
                Step::Status("Processing", None),
                Step::Status("Success", Some("f")),
            ]
        };

        let quiet = ScriptedProvider::new("t1", script());
        let silent = poller(&quiet)
            .wait_for_completion("t1", |_| {}, Duration::from_secs(10))
            .await
            .unwrap();

        let loud = ScriptedProvider::new("t1", script());
        let mut seen = Vec::new();
        let logged = poller(&loud)
            .wait_for_completion("t1", |task| seen.push(task.status), Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(silent, logged);
        assert_eq!(
            seen,
            vec![TaskStatus::Pending, TaskStatus::Processing, TaskStatus::Completed]
        );
    }

    #[tokio::test]
    async fn test_invalid_params_aborts_immediately() {
        let provider = ScriptedProvider::new(
            "t1",
            vec![Step::Status("Processing", None), Step::Invalid],
        );

        let err = poller(&provider)
            .wait_for_completion("t1", |_| {}, Duration::from_secs(10))
            .await
            .unwrap_err();

        assert!(matches!(err, StudyreelError::UnexpectedResponse(_)));
        assert_eq!(provider.query_count(), 2);
    }

    #[tokio::test]
    async fn test_authentication_error_is_not_retried() {
        let provider = ScriptedProvider::new("t1", vec![Step::Unauthorized]);

        let err = poller(&provider)
            .wait_for_completion("t1", |_| {}, Duration::from_secs(10))
            .await
            .unwrap_err();

        assert!(matches!(err, StudyreelError::Authentication(_)));
        assert_eq!(provider.query_count(), 1);
    }

    #[tokio::test]
    async fn test_transient_errors_keep_polling() {
        let provider = ScriptedProvider::new(
            "t1",
            vec![
                Step::Transient,
                Step::Status("Processing", None),
                Step::Transient,
                Step::Status("Success", Some("f")),
            ],
        );

        let task = poller(&provider)
            .wait_for_completion("t1", |_| {}, Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(task.usable_file_ref(), Some("f"));
        assert_eq!(provider.query_count(), 4);
    }

    #[tokio::test]
    async fn test_unknown_status_keeps_polling() {
        let provider = ScriptedProvider::new(
            "t1",
            vec![
                Step::Status("Rendering", None),
                Step::Status("success", Some("f")),
            ],
        );

        let task = poller(&provider)
            .wait_for_completion("t1", |_| {}, Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(provider.query_count(), 2);
    }

    #[tokio::test]
    async fn test_completed_without_file_keeps_polling() {
        let provider = ScriptedProvider::new(
            "t1",
            vec![Step::Status("Success", None), Step::Status("Success", Some("f"))],
        );

        let task = poller(&provider)
            .wait_for_completion("t1", |_| {}, Duration::from_secs(10))
            .await
            .unwrap();
        assert_eq!(task.usable_file_ref(), Some("f"));
        assert_eq!(provider.query_count(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let provider = ScriptedProvider::new("t1", vec![Step::Status("Processing", None)]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = poller(&provider)
            .with_cancellation(cancel)
            .wait_for_completion("t1", |_| {}, Duration::from_secs(10))
            .await
            .unwrap_err();

        assert!(matches!(err, StudyreelError::Cancelled { .. }));
        assert_eq!(provider.query_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_while_sleeping() {
        let provider = ScriptedProvider::new("t1", vec![Step::Status("Processing", None)]);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = StatusPoller::new(&provider, PollConfig::new(Duration::from_secs(30)))
            .with_cancellation(cancel)
            .wait_for_completion("t1", |_| {}, Duration::from_secs(300))
            .await
            .unwrap_err();

        assert!(matches!(err, StudyreelError::Cancelled { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(provider.query_count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_during_status_query() {
        let provider = ScriptedProvider::new("t1", vec![Step::Slow(Duration::from_secs(30))]);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let mut updates = 0;
        let started = std::time::Instant::now();
        let err = poller(&provider)
            .with_cancellation(cancel)
            .wait_for_completion("t1", |_| updates += 1, Duration::from_secs(300))
            .await
            .unwrap_err();

        assert!(matches!(err, StudyreelError::Cancelled { ref task_id } if task_id == "t1"));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(provider.query_count(), 1);
        assert_eq!(updates, 0);
    }
}
