//! Artifact download and local persistence.
//!
//! Fetches the finished video from its resolved URL and writes it under a
//! destination directory. Files are written through a temporary file in the
//! same directory and moved into place only once the whole payload is on disk.

use super::LocalArtifact;
use crate::error::{Result, StudyreelError};
use chrono::{DateTime, Local};
use reqwest::Client;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Payloads smaller than this are kept but flagged; a real clip is tens of KB at least.
pub const MIN_EXPECTED_BYTES: u64 = 1024;

/// Extension used when the URL does not carry a usable one.
const DEFAULT_EXTENSION: &str = "mp4";

/// Downloads resolved artifacts over plain HTTP.
///
/// The download URL is itself the capability, so no credentials are sent.
pub struct ArtifactDownloader {
    http: Client,
}

impl ArtifactDownloader {
    /// Create a downloader whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }

    /// Download `url` into `dest_dir`, creating the directory if needed.
    ///
    /// Without an explicit `filename` the file is named after the task id and
    /// the current time, with a numeric suffix if that name is already taken.
    #[instrument(skip(self, url), fields(task_id = %task_id, dest_dir = %dest_dir.display()))]
    pub async fn download(
        &self,
        url: &str,
        task_id: &str,
        dest_dir: &Path,
        filename: Option<&str>,
    ) -> Result<LocalArtifact> {
        if let Some(name) = filename {
            check_filename(name)?;
        }
        tokio::fs::create_dir_all(dest_dir).await?;

        info!("Downloading artifact for task {}", task_id);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StudyreelError::Download(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StudyreelError::Download(format!(
                "server answered HTTP {}",
                status.as_u16()
            )));
        }

        let declared = response.content_length();
        let payload = response
            .bytes()
            .await
            .map_err(|e| StudyreelError::Download(format!("reading body failed: {e}")))?;

        let size_bytes = payload.len() as u64;
        if size_bytes == 0 {
            return Err(StudyreelError::Download("server returned an empty body".into()));
        }
        if let Some(expected) = declared {
            if expected != size_bytes {
                return Err(StudyreelError::Download(format!(
                    "truncated payload: received {size_bytes} of {expected} bytes"
                )));
            }
        }
        if let Some(message) = size_warning(task_id, size_bytes) {
            warn!("{}", message);
        }

        let path = match filename {
            Some(name) => write_named(dest_dir, name, &payload)?,
            None => {
                let name = default_filename(task_id, url, Local::now());
                write_unique(dest_dir, &name, &payload)?
            }
        };

        info!("Saved {} bytes to {}", size_bytes, path.display());
        Ok(LocalArtifact {
            path,
            task_id: task_id.to_string(),
            size_bytes,
        })
    }
}

/// Warning text for a payload too small to plausibly be a video.
fn size_warning(task_id: &str, size_bytes: u64) -> Option<String> {
    (size_bytes < MIN_EXPECTED_BYTES).then(|| {
        format!(
            "Artifact for task {} is only {} bytes, which is unusually small for a video",
            task_id, size_bytes
        )
    })
}

/// An explicit file name must be a single plain path component inside the destination.
fn check_filename(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(StudyreelError::InvalidInput(format!(
            "file name {:?} must be a plain name without directories",
            name
        ))),
    }
}

/// Build `video_<task_id>_<YYYYMMDD_HHMMSS>.<ext>`, taking the extension from the URL path.
pub fn default_filename(task_id: &str, url: &str, now: DateTime<Local>) -> String {
    format!(
        "video_{}_{}.{}",
        sanitize(task_id),
        now.format("%Y%m%d_%H%M%S"),
        extension_from_url(url)
    )
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn extension_from_url(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.path_segments().and_then(|s| s.last()).map(str::to_string))
        .and_then(|last| {
            Path::new(&last)
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
        })
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Write to `dest_dir/name`, replacing any existing file.
fn write_named(dest_dir: &Path, name: &str, payload: &[u8]) -> Result<PathBuf> {
    let path = dest_dir.join(name);

    let mut tmp = tempfile::NamedTempFile::new_in(dest_dir)?;
    tmp.write_all(payload)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|e| StudyreelError::Io(e.error))?;
    Ok(path)
}

/// Write to `dest_dir/name`, or `name` with a `_N` suffix if taken. Never overwrites.
fn write_unique(dest_dir: &Path, name: &str, payload: &[u8]) -> Result<PathBuf> {
    let mut tmp = tempfile::NamedTempFile::new_in(dest_dir)?;
    tmp.write_all(payload)?;
    tmp.as_file().sync_all()?;

    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string();
    let ext = Path::new(name).extension().and_then(|e| e.to_str());

    let mut candidate = dest_dir.join(name);
    let mut suffix = 1u32;
    loop {
        match tmp.persist_noclobber(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!("{} exists, trying another name", candidate.display());
                tmp = e.file;
                let next = match ext {
                    Some(ext) => format!("{stem}_{suffix}.{ext}"),
                    None => format!("{stem}_{suffix}"),
                };
                candidate = dest_dir.join(next);
                suffix += 1;
            }
            Err(e) => return Err(StudyreelError::Io(e.error)),
        }
    }
}
