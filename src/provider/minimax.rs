//! MiniMax-style video generation client.

use super::wire::{
    check_base_resp, check_http_status, first_string, preview, BaseResp, DOWNLOAD_URL_FIELDS,
    ERROR_FIELDS, FILE_ID_FIELDS, STATUS_FIELDS, TASK_ID_FIELDS,
};
use super::{GenerationRequest, VideoProvider};
use crate::config::Credentials;
use crate::error::{Result, StudyreelError};
use crate::job::{FileReference, GenerationTask};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Default API base URL, used when the config does not set `provider.base_url`.
pub const DEFAULT_BASE_URL: &str = "https://api.minimax.io/v1";

/// Connect timeout applied to every request.
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Serialize)]
struct CreateTaskBody<'a> {
    model: &'a str,
    prompt: &'a str,
    duration: u32,
    aspect_ratio: &'a str,
    resolution: &'a str,
    prompt_optimizer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_id: Option<&'a str>,
}

/// HTTP client for the video generation, status query and file retrieval endpoints.
pub struct MinimaxClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl MinimaxClient {
    /// Create a client pointing at a custom base URL.
    pub fn with_base_url(
        credentials: Credentials,
        base_url: &str,
        request_timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send an authenticated request and return the checked JSON body.
    async fn send_json(&self, request: RequestBuilder, context: &str) -> Result<Value> {
        let response = request
            .bearer_auth(&self.credentials.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        check_http_status(status, &body, context)?;

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            StudyreelError::UnexpectedResponse(format!(
                "{context}: response is not JSON ({e}): {}",
                preview(&body)
            ))
        })?;
        check_base_resp(&value, context)?;

        Ok(value)
    }
}

#[async_trait]
impl VideoProvider for MinimaxClient {
    #[instrument(skip(self, request), fields(duration = request.duration_seconds))]
    async fn create_task(&self, request: &GenerationRequest) -> Result<String> {
        if request.prompt.trim().is_empty() {
            return Err(StudyreelError::InvalidInput("prompt must not be empty".into()));
        }

        let group_id = request
            .options
            .group_id
            .as_deref()
            .or(self.credentials.group_id.as_deref());

        let body = CreateTaskBody {
            model: &request.options.model,
            prompt: &request.prompt,
            duration: request.duration_seconds,
            aspect_ratio: &request.options.aspect_ratio,
            resolution: &request.options.resolution,
            prompt_optimizer: request.options.prompt_optimizer,
            group_id,
        };

        // An unreachable submission endpoint means a wrong base URL, not a passing outage
        let value = self
            .send_json(
                self.http.post(self.url("video_generation")).json(&body),
                "create task",
            )
            .await
            .map_err(|e| match e {
                StudyreelError::Http(err) if err.is_connect() => {
                    StudyreelError::NotFound(format!("create task: {} ({})", self.base_url, err))
                }
                other => other,
            })?;

        let task_id = first_string(&value, TASK_ID_FIELDS).ok_or_else(|| {
            StudyreelError::UnexpectedResponse(format!(
                "create task: no task id in response: {}",
                preview(&value.to_string())
            ))
        })?;

        info!("Created generation task {}", task_id);
        Ok(task_id)
    }

    #[instrument(skip(self))]
    async fn query_task(&self, task_id: &str) -> Result<GenerationTask> {
        let value = self
            .send_json(
                self.http
                    .get(self.url("query/video_generation"))
                    .query(&[("task_id", task_id)]),
                "query status",
            )
            .await?;

        let raw_status = first_string(&value, STATUS_FIELDS).ok_or_else(|| {
            StudyreelError::UnexpectedResponse(format!(
                "query status: no status in response: {}",
                preview(&value.to_string())
            ))
        })?;

        let error = first_string(&value, ERROR_FIELDS).or_else(|| {
            BaseResp::from_body(&value)
                .map(|b| b.status_msg)
                .filter(|m| !m.is_empty() && !m.eq_ignore_ascii_case("success"))
        });

        let task = GenerationTask::from_raw(
            first_string(&value, TASK_ID_FIELDS).unwrap_or_else(|| task_id.to_string()),
            raw_status,
            first_string(&value, FILE_ID_FIELDS),
            error,
        );

        debug!("Task {} is {} ({})", task.task_id, task.status, task.raw_status);
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn retrieve_file(&self, file_ref: &str) -> Result<FileReference> {
        let mut query = vec![("file_id", file_ref)];
        if let Some(group_id) = self.credentials.group_id.as_deref() {
            query.push(("GroupId", group_id));
        }

        let value = self
            .send_json(
                self.http.get(self.url("files/retrieve")).query(&query),
                "retrieve file",
            )
            .await?;

        // Some responses nest the record under "file", others return it flat
        let file = value.get("file").unwrap_or(&value);

        Ok(FileReference {
            file_ref: first_string(file, FILE_ID_FIELDS).unwrap_or_else(|| file_ref.to_string()),
            download_url: first_string(file, DOWNLOAD_URL_FIELDS),
            filename: first_string(file, &["filename"]),
            bytes: file.get("bytes").and_then(Value::as_u64),
        })
    }
}
