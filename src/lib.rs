//! studyreel - Study videos from questions
//!
//! A CLI tool that turns a study question into a short AI-generated video.
//!
//! # Overview
//!
//! A run submits a text prompt to a video-generation provider, polls the
//! task until it finishes, resolves the finished file to a download URL and
//! saves the video locally. Each step can fail in its own way, and the
//! errors say which step failed.
//!
//! # Architecture
//!
//! - `config` - Settings, credentials and prompt templates
//! - `input` - Question text and exercise sheets
//! - `provider` - Video provider abstraction and the MiniMax client
//! - `job` - Task status model, status polling and file resolution
//! - `artifact` - Downloading finished videos to disk
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use studyreel::config::{Settings, VideoStyle};
//! use studyreel::orchestrator::{Orchestrator, VideoRequest};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let request = VideoRequest {
//!         prompt: orchestrator.build_prompt("Why is the sky blue?", None, VideoStyle::Explainer),
//!         ..Default::default()
//!     };
//!     let outcome = orchestrator
//!         .generate(&request, |task| println!("{}", task.status), CancellationToken::new())
//!         .await?;
//!     if let Some(artifact) = outcome.artifact {
//!         println!("Saved {}", artifact.path.display());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod job;
pub mod orchestrator;
pub mod provider;

pub use error::{Result, StudyreelError};
