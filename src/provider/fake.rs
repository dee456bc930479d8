//! Scripted in-memory provider for tests.

use super::{GenerationRequest, VideoProvider};
use crate::error::{Result, StudyreelError};
use crate::job::{FileReference, GenerationTask};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Instant;

/// One scripted answer to a status query.
#[derive(Debug, Clone)]
pub enum Step {
    /// Respond with this raw status and optional file id.
    Status(&'static str, Option<&'static str>),
    /// Respond with a failed status and message.
    Failed(&'static str),
    /// Fail the query with a transient transport error.
    Transient,
    /// Fail the query with a non-retryable error.
    Invalid,
    /// Fail the query with a credential error.
    Unauthorized,
    /// Answer "Processing", but only after this long.
    Slow(std::time::Duration),
}

/// Provider whose status answers follow a script; the last step repeats forever.
pub struct ScriptedProvider {
    task_id: String,
    steps: Mutex<VecDeque<Step>>,
    last: Mutex<Option<Step>>,
    files: HashMap<String, Option<String>>,
    query_times: Mutex<Vec<Instant>>,
    created: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    pub fn new(task_id: &str, steps: Vec<Step>) -> Self {
        Self {
            task_id: task_id.to_string(),
            steps: Mutex::new(steps.into()),
            last: Mutex::new(None),
            files: HashMap::new(),
            query_times: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Register the download URL a file id resolves to (`None` for a missing URL).
    pub fn with_file(mut self, file_id: &str, url: Option<&str>) -> Self {
        self.files
            .insert(file_id.to_string(), url.map(str::to_string));
        self
    }

    pub fn query_count(&self) -> usize {
        self.query_times.lock().unwrap().len()
    }

    pub fn query_times(&self) -> Vec<Instant> {
        self.query_times.lock().unwrap().clone()
    }

    pub fn created_requests(&self) -> Vec<GenerationRequest> {
        self.created.lock().unwrap().clone()
    }

    fn next_step(&self) -> Step {
        let mut steps = self.steps.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        if let Some(step) = steps.pop_front() {
            *last = Some(step.clone());
            step
        } else {
            last.clone().unwrap_or(Step::Status("Processing", None))
        }
    }
}

#[async_trait]
impl VideoProvider for ScriptedProvider {
    async fn create_task(&self, request: &GenerationRequest) -> Result<String> {
        self.created.lock().unwrap().push(request.clone());
        Ok(self.task_id.clone())
    }

    async fn query_task(&self, task_id: &str) -> Result<GenerationTask> {
        self.query_times.lock().unwrap().push(Instant::now());
        match self.next_step() {
            Step::Status(raw, file_id) => Ok(GenerationTask::from_raw(
                task_id,
                raw,
                file_id.map(str::to_string),
                None,
            )),
            Step::Failed(message) => Ok(GenerationTask::from_raw(
                task_id,
                "Fail",
                None,
                Some(message.to_string()),
            )),
            Step::Transient => Err(StudyreelError::Transport("HTTP 502".into())),
            Step::Invalid => Err(StudyreelError::UnexpectedResponse(
                "provider returned status_code 2013 (invalid params)".into(),
            )),
            Step::Unauthorized => Err(StudyreelError::Authentication("HTTP 401".into())),
            Step::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(GenerationTask::from_raw(task_id, "Processing", None, None))
            }
        }
    }

    async fn retrieve_file(&self, file_ref: &str) -> Result<FileReference> {
        match self.files.get(file_ref) {
            Some(url) => Ok(FileReference {
                file_ref: file_ref.to_string(),
                download_url: url.clone(),
                filename: None,
                bytes: None,
            }),
            None => Err(StudyreelError::NotFound(format!("file {file_ref}"))),
        }
    }
}
