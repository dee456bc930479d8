//! Pipeline orchestrator for studyreel.
//!
//! Coordinates the whole flow from task creation to a video on disk:
//! create, poll until terminal, resolve the file reference, then download.

use crate::artifact::{ArtifactDownloader, LocalArtifact};
use crate::config::{Credentials, Settings, VideoPrompts, VideoStyle};
use crate::error::{Result, StudyreelError};
use crate::job::{resolve_download_url, GenerationTask, PollConfig, StatusPoller, TaskStatus};
use crate::provider::{clamp_duration, GenerationOptions, GenerationRequest, MinimaxClient, VideoProvider};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// What to generate and where to put it.
#[derive(Debug, Clone, Default)]
pub struct VideoRequest {
    /// Final prompt sent to the provider.
    pub prompt: String,
    /// Requested clip length; the configured default when unset.
    pub duration_seconds: Option<u32>,
    /// Destination directory; the configured output directory when unset.
    pub output_dir: Option<PathBuf>,
    /// File name inside the destination directory; derived from the task id when unset.
    pub filename: Option<String>,
    /// Stop after the task completes, without resolving or downloading.
    pub skip_download: bool,
}

/// Result of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    /// Last observed state of the task.
    pub task: GenerationTask,
    /// Resolved download URL, if the pipeline got that far.
    pub download_url: Option<String>,
    /// Downloaded file, if the pipeline got that far.
    pub artifact: Option<LocalArtifact>,
}

/// The main orchestrator for the studyreel pipeline.
pub struct Orchestrator {
    settings: Settings,
    prompts: VideoPrompts,
    provider: Arc<dyn VideoProvider>,
    downloader: ArtifactDownloader,
}

impl Orchestrator {
    /// Create an orchestrator talking to the configured provider.
    ///
    /// Fails if the provider credentials are missing from the environment.
    pub fn new(settings: Settings) -> Result<Self> {
        let credentials = Credentials::from_env()?;

        let prompts = VideoPrompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let provider: Arc<dyn VideoProvider> = Arc::new(MinimaxClient::with_base_url(
            credentials,
            &settings.provider.base_url,
            settings.polling.request_timeout(),
        )?);

        let downloader = ArtifactDownloader::new(settings.polling.download_timeout())?;

        Ok(Self {
            settings,
            prompts,
            provider,
            downloader,
        })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: VideoPrompts,
        provider: Arc<dyn VideoProvider>,
        downloader: ArtifactDownloader,
    ) -> Self {
        Self {
            settings,
            prompts,
            provider,
            downloader,
        }
    }

    /// Turn a study question into a provider prompt.
    pub fn build_prompt(&self, topic: &str, context: Option<&str>, style: VideoStyle) -> String {
        self.prompts.build(topic, context, style)
    }

    /// Create a task, wait for it, and download the result.
    #[instrument(skip(self, request, on_progress, cancel))]
    pub async fn generate<F>(
        &self,
        request: &VideoRequest,
        on_progress: F,
        cancel: CancellationToken,
    ) -> Result<GenerationOutcome>
    where
        F: FnMut(&GenerationTask),
    {
        let requested = request
            .duration_seconds
            .unwrap_or(self.settings.provider.default_duration_seconds);
        let duration_seconds = clamp_duration(requested);
        if duration_seconds != requested {
            warn!("Clip length {}s is out of range, using {}s", requested, duration_seconds);
        }

        let task_id = self
            .provider
            .create_task(&GenerationRequest {
                prompt: request.prompt.clone(),
                duration_seconds,
                options: GenerationOptions::from(&self.settings.provider),
            })
            .await?;

        let task = self
            .poll(
                &task_id,
                self.settings.polling.generate_interval(),
                on_progress,
                cancel.clone(),
            )
            .await?;

        if request.skip_download {
            info!("Task {} completed; download skipped", task_id);
            return Ok(GenerationOutcome {
                task,
                download_url: None,
                artifact: None,
            });
        }

        self.finish(
            task,
            request.output_dir.clone(),
            request.filename.as_deref(),
            &cancel,
        )
        .await
    }

    /// Download the result of an existing task.
    ///
    /// With `wait`, polls until the task finishes; otherwise a single status
    /// check must already show it completed.
    #[instrument(skip(self, on_progress, cancel))]
    pub async fn fetch<F>(
        &self,
        task_id: &str,
        wait: bool,
        output_dir: Option<PathBuf>,
        filename: Option<&str>,
        mut on_progress: F,
        cancel: CancellationToken,
    ) -> Result<GenerationOutcome>
    where
        F: FnMut(&GenerationTask),
    {
        let task = if wait {
            self.poll(
                task_id,
                self.settings.polling.download_interval(),
                on_progress,
                cancel.clone(),
            )
            .await?
        } else {
            let task = self.provider.query_task(task_id).await?;
            on_progress(&task);
            match task.status {
                TaskStatus::Completed if task.usable_file_ref().is_some() => task,
                TaskStatus::Failed => {
                    return Err(StudyreelError::ProviderFailure {
                        task_id: task_id.to_string(),
                        message: task
                            .error
                            .unwrap_or_else(|| "provider gave no reason".to_string()),
                    })
                }
                _ => {
                    return Err(StudyreelError::TaskNotReady {
                        task_id: task_id.to_string(),
                        status: task.raw_status,
                    })
                }
            }
        };

        self.finish(task, output_dir, filename, &cancel).await
    }

    /// Query a task's status once.
    pub async fn status(&self, task_id: &str) -> Result<GenerationTask> {
        self.provider.query_task(task_id).await
    }

    async fn poll<F>(
        &self,
        task_id: &str,
        interval: Duration,
        on_progress: F,
        cancel: CancellationToken,
    ) -> Result<GenerationTask>
    where
        F: FnMut(&GenerationTask),
    {
        StatusPoller::new(self.provider.as_ref(), PollConfig::new(interval))
            .with_cancellation(cancel)
            .wait_for_completion(task_id, on_progress, self.settings.polling.max_wait())
            .await
    }

    /// Resolve and download a completed task, giving up as soon as `cancel` fires.
    async fn finish(
        &self,
        task: GenerationTask,
        output_dir: Option<PathBuf>,
        filename: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GenerationOutcome> {
        let file_ref = task.usable_file_ref().ok_or_else(|| StudyreelError::TaskNotReady {
            task_id: task.task_id.clone(),
            status: task.raw_status.clone(),
        })?;

        let url = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(&task.task_id, "resolving the download URL")),
            url = resolve_download_url(self.provider.as_ref(), file_ref) => url?,
        };

        let dest = output_dir.unwrap_or_else(|| self.settings.output_dir());
        let artifact = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(&task.task_id, "downloading")),
            artifact = self.downloader.download(&url, &task.task_id, &dest, filename) => artifact?,
        };

        Ok(GenerationOutcome {
            task,
            download_url: Some(url),
            artifact: Some(artifact),
        })
    }
}

fn cancelled(task_id: &str, step: &str) -> StudyreelError {
    info!("Task {} cancelled while {}", task_id, step);
    StudyreelError::Cancelled {
        task_id: task_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::fake::{ScriptedProvider, Step};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_settings() -> Settings {
        let mut settings = Settings::default();
        settings.polling.generate_interval_secs = 1;
        settings.polling.download_interval_secs = 1;
        settings.polling.max_wait_secs = 30;
        settings
    }

    fn orchestrator(provider: Arc<ScriptedProvider>) -> Orchestrator {
        Orchestrator::with_components(
            fast_settings(),
            VideoPrompts::default(),
            provider,
            ArtifactDownloader::new(Duration::from_secs(30)).unwrap(),
        )
    }

    async fn artifact_host(bytes: usize) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/output/361721749176519.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x42u8; bytes]))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_generate_end_to_end() {
        let host = artifact_host(1_164_000).await;
        let url = format!("{}/output/361721749176519.mp4", host.uri());

        let provider = Arc::new(
            ScriptedProvider::new(
                "361720188367060",
                vec![
                    Step::Status("Processing", None),
                    Step::Status("Processing", None),
                    Step::Status("Success", Some("361721749176519")),
                ],
            )
            .with_file("361721749176519", Some(&url)),
        );
        let orch = orchestrator(provider.clone());
        let dest = tempfile::tempdir().unwrap();

        let mut updates = 0;
        let outcome = orch
            .generate(
                &VideoRequest {
                    prompt: "Explain the Pythagorean theorem".to_string(),
                    duration_seconds: Some(30),
                    output_dir: Some(dest.path().join("videos")),
                    ..Default::default()
                },
                |_| updates += 1,
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(provider.query_count(), 3);
        assert_eq!(updates, 3);
        assert_eq!(provider.created_requests()[0].duration_seconds, 10);

        let artifact = outcome.artifact.unwrap();
        assert_eq!(artifact.size_bytes, 1_164_000);
        assert!(artifact
            .path
            .to_string_lossy()
            .contains("361720188367060"));
        assert!(artifact.path.starts_with(dest.path().join("videos")));
        assert_eq!(outcome.download_url.as_deref(), Some(url.as_str()));
    }

    #[tokio::test]
    async fn test_generate_skip_download() {
        let provider = Arc::new(ScriptedProvider::new(
            "t1",
            vec![Step::Status("Success", Some("f1"))],
        ));
        let orch = orchestrator(provider);

        let outcome = orch
            .generate(
                &VideoRequest {
                    prompt: "Explain osmosis".to_string(),
                    skip_download: true,
                    ..Default::default()
                },
                |_| {},
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.task.status, TaskStatus::Completed);
        assert!(outcome.artifact.is_none());
    }

    #[tokio::test]
    async fn test_fetch_without_wait_requires_completion() {
        let provider = Arc::new(ScriptedProvider::new(
            "t1",
            vec![Step::Status("Processing", None)],
        ));
        let orch = orchestrator(provider.clone());

        let err = orch
            .fetch("t1", false, None, None, |_| {}, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, StudyreelError::TaskNotReady { ref status, .. } if status == "Processing"));
        assert_eq!(provider.query_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failed_task() {
        let provider = Arc::new(ScriptedProvider::new("t1", vec![Step::Failed("bad prompt")]));
        let orch = orchestrator(provider);

        let err = orch
            .fetch("t1", false, None, None, |_| {}, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StudyreelError::ProviderFailure { .. }));
    }

    #[tokio::test]
    async fn test_fetch_resolution_failure_skips_download() {
        let provider = Arc::new(
            ScriptedProvider::new("t1", vec![Step::Status("Success", Some("f1"))])
                .with_file("f1", Some("")),
        );
        let orch = orchestrator(provider);
        let dest = tempfile::tempdir().unwrap();

        let err = orch
            .fetch(
                "t1",
                true,
                Some(dest.path().to_path_buf()),
                None,
                |_| {},
                CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StudyreelError::Resolution(_)));
        assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_with_wait_and_filename() {
        let host = artifact_host(8192).await;
        let url = format!("{}/output/361721749176519.mp4", host.uri());

        let provider = Arc::new(
            ScriptedProvider::new(
                "t1",
                vec![
                    Step::Status("Processing", None),
                    Step::Status("Success", Some("361721749176519")),
                ],
            )
            .with_file("361721749176519", Some(&url)),
        );
        let orch = orchestrator(provider);
        let dest = tempfile::tempdir().unwrap();

        let outcome = orch
            .fetch(
                "t1",
                true,
                Some(dest.path().to_path_buf()),
                Some("lesson.mp4"),
                |_| {},
                CancellationToken::new(),
            )
            .await
            .unwrap();

        let artifact = outcome.artifact.unwrap();
        assert_eq!(artifact.path, dest.path().join("lesson.mp4"));
        assert_eq!(artifact.size_bytes, 8192);
    }

    #[test]
    fn test_build_prompt_uses_templates() {
        let orch = orchestrator(Arc::new(ScriptedProvider::new("t1", vec![])));
        let prompt = orch.build_prompt("entropy", None, VideoStyle::Explainer);
        assert!(prompt.starts_with("Create an educational video explaining entropy."));
    }

    #[tokio::test]
    async fn test_cancel_during_download_stops_pipeline() {
        let host = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/output/slow.mp4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(vec![0x42u8; 4096])
                    .set_delay(Duration::from_secs(20)),
            )
            .mount(&host)
            .await;
        let url = format!("{}/output/slow.mp4", host.uri());

        let provider = Arc::new(
            ScriptedProvider::new("t1", vec![Step::Status("Success", Some("f1"))])
                .with_file("f1", Some(&url)),
        );
        let orch = orchestrator(provider);
        let dest = tempfile::tempdir().unwrap();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = orch
            .fetch("t1", false, Some(dest.path().to_path_buf()), None, |_| {}, cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, StudyreelError::Cancelled { ref task_id } if task_id == "t1"));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_token_skips_download() {
        let host = artifact_host(4096).await;
        let url = format!("{}/output/361721749176519.mp4", host.uri());

        let provider = Arc::new(
            ScriptedProvider::new("t1", vec![Step::Status("Success", Some("361721749176519"))])
                .with_file("361721749176519", Some(&url)),
        );
        let orch = orchestrator(provider);
        let dest = tempfile::tempdir().unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = orch
            .fetch("t1", false, Some(dest.path().to_path_buf()), None, |_| {}, cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, StudyreelError::Cancelled { .. }));
        assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 0);
    }
}
