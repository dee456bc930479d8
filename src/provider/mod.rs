//! Video generation provider abstraction.
//!
//! The pipeline talks to a provider only through [`VideoProvider`], with one
//! method per provider round trip.

#[cfg(test)]
pub(crate) mod fake;
mod minimax;
pub mod wire;

pub use minimax::{MinimaxClient, DEFAULT_BASE_URL};

use crate::config::ProviderSettings;
use crate::error::Result;
use crate::job::{FileReference, GenerationTask};
use async_trait::async_trait;
use serde::Serialize;

/// Shortest clip the provider accepts, in seconds.
pub const MIN_DURATION_SECONDS: u32 = 5;
/// Longest clip the provider accepts, in seconds.
pub const MAX_DURATION_SECONDS: u32 = 10;

/// Clamp a requested clip length into the accepted range.
pub fn clamp_duration(seconds: u32) -> u32 {
    seconds.clamp(MIN_DURATION_SECONDS, MAX_DURATION_SECONDS)
}

/// Provider-specific knobs sent along with a generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOptions {
    pub model: String,
    pub aspect_ratio: String,
    pub resolution: String,
    pub prompt_optimizer: bool,
    /// Grouping identifier; falls back to the client's credentials when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl From<&ProviderSettings> for GenerationOptions {
    fn from(settings: &ProviderSettings) -> Self {
        Self {
            model: settings.model.clone(),
            aspect_ratio: settings.aspect_ratio.clone(),
            resolution: settings.resolution.clone(),
            prompt_optimizer: settings.prompt_optimizer,
            group_id: None,
        }
    }
}

/// A request to generate one video clip.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub duration_seconds: u32,
    pub options: GenerationOptions,
}

/// Trait for asynchronous video generation backends.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Submit a generation request and return the provider's task id.
    ///
    /// Never returns an empty id.
    async fn create_task(&self, request: &GenerationRequest) -> Result<String>;

    /// Fetch the current status of a task.
    async fn query_task(&self, task_id: &str) -> Result<GenerationTask>;

    /// Look up a file reference produced by a completed task.
    async fn retrieve_file(&self, file_ref: &str) -> Result<FileReference>;
}
