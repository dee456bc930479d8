//! Generation task data model.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Normalized lifecycle status of a remote generation task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    /// A status string the provider sent that we do not recognize.
    /// Polled through like `Pending`.
    Unknown,
}

impl TaskStatus {
    /// Map a provider status string onto the closed set of states.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace,
    /// dashes and underscores.
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "pending" | "queueing" | "queued" | "preparing" | "submitted" | "created"
            | "waiting" => TaskStatus::Pending,
            "processing" | "running" | "inprogress" | "generating" => TaskStatus::Processing,
            "success" | "succeeded" | "successful" | "completed" | "complete" | "done"
            | "finished" => TaskStatus::Completed,
            "fail" | "failed" | "failure" | "error" => TaskStatus::Failed,
            _ => {
                warn!("Unrecognized task status {:?}, treating it as pending", raw);
                TaskStatus::Unknown
            }
        }
    }

    /// Whether polling should stop on this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Processing => write!(f, "processing"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// A snapshot of a remote generation task, as last reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationTask {
    /// Opaque task identifier assigned by the provider.
    pub task_id: String,
    /// Normalized status.
    pub status: TaskStatus,
    /// Status string exactly as the provider sent it.
    pub raw_status: String,
    /// Opaque file reference, present once generation has produced output.
    pub file_ref: Option<String>,
    /// Provider-supplied failure reason.
    pub error: Option<String>,
}

impl GenerationTask {
    /// Build a snapshot from a raw provider status string.
    pub fn from_raw(
        task_id: impl Into<String>,
        raw_status: impl Into<String>,
        file_ref: Option<String>,
        error: Option<String>,
    ) -> Self {
        let raw_status = raw_status.into();
        Self {
            task_id: task_id.into(),
            status: TaskStatus::parse(&raw_status),
            raw_status,
            file_ref: file_ref.filter(|f| !f.trim().is_empty()),
            error,
        }
    }

    /// The file reference, if the task is completed and has one.
    pub fn usable_file_ref(&self) -> Option<&str> {
        match self.status {
            TaskStatus::Completed => self.file_ref.as_deref(),
            _ => None,
        }
    }
}

/// A provider file reference and the download URL it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    pub file_ref: String,
    /// Short-lived download URL. Only valid for an immediate download.
    pub download_url: Option<String>,
    pub filename: Option<String>,
    /// Size reported by the provider; may be absent or zero.
    pub bytes: Option<u64>,
}
