//! Error types for studyreel.

use std::time::Duration;
use thiserror::Error;

/// Library-level error type for studyreel operations.
#[derive(Error, Debug)]
pub enum StudyreelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("Endpoint not found: {0}")]
    NotFound(String),

    #[error("Unexpected provider response: {0}")]
    UnexpectedResponse(String),

    #[error("Generation failed for task {task_id}: {message}")]
    ProviderFailure { task_id: String, message: String },

    #[error("Could not resolve a download URL for file {0}")]
    Resolution(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Task {task_id} did not finish within {}s", .waited.as_secs())]
    Timeout { task_id: String, waited: Duration },

    #[error("Polling for task {task_id} was cancelled")]
    Cancelled { task_id: String },

    #[error("Task {task_id} is not ready yet (status: {status})")]
    TaskNotReady { task_id: String, status: String },

    #[error("Rate limited by provider: {0}")]
    RateLimited(String),

    #[error("Provider transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl StudyreelError {
    /// Whether a failed status query may succeed if simply repeated.
    ///
    /// The poller keeps going through these and gives up on everything else.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StudyreelError::Http(_) | StudyreelError::Transport(_) | StudyreelError::RateLimited(_)
        )
    }
}

/// Result type alias for studyreel operations.
pub type Result<T> = std::result::Result<T, StudyreelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StudyreelError::Transport("502".into()).is_transient());
        assert!(StudyreelError::RateLimited("1002".into()).is_transient());
        assert!(!StudyreelError::Authentication("bad key".into()).is_transient());
        assert!(!StudyreelError::Permission("no balance".into()).is_transient());
        assert!(!StudyreelError::UnexpectedResponse("2013".into()).is_transient());
    }

    #[test]
    fn test_timeout_and_failure_render_differently() {
        let timeout = StudyreelError::Timeout {
            task_id: "42".into(),
            waited: Duration::from_secs(300),
        };
        let failure = StudyreelError::ProviderFailure {
            task_id: "42".into(),
            message: "content rejected".into(),
        };
        assert_eq!(timeout.to_string(), "Task 42 did not finish within 300s");
        assert_eq!(
            failure.to_string(),
            "Generation failed for task 42: content rejected"
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StudyreelError>();
    }
}
