//! Local persistence of generated videos.

mod downloader;

pub use downloader::{default_filename, ArtifactDownloader, MIN_EXPECTED_BYTES};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A downloaded artifact on local disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalArtifact {
    pub path: PathBuf,
    pub task_id: String,
    /// Size of the payload actually received.
    pub size_bytes: u64,
}
