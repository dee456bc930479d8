//! Resolution of a completed task's file reference into a download URL.

use crate::error::{Result, StudyreelError};
use crate::provider::VideoProvider;
use tracing::{debug, instrument, warn};

/// Look up the download URL for `file_ref`.
///
/// The returned URL is time-limited by the provider and should be used right away.
/// A lookup that succeeds but carries no usable URL is a [`StudyreelError::Resolution`].
#[instrument(skip(provider))]
pub async fn resolve_download_url(provider: &dyn VideoProvider, file_ref: &str) -> Result<String> {
    if file_ref.trim().is_empty() {
        return Err(StudyreelError::InvalidInput(
            "file reference must not be empty".into(),
        ));
    }

    let file = provider.retrieve_file(file_ref).await?;

    let url = match file.download_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => {
            warn!("File {} resolved without a download URL", file_ref);
            return Err(StudyreelError::Resolution(file_ref.to_string()));
        }
    };

    if let Err(e) = url::Url::parse(&url) {
        warn!("File {} resolved to an unusable URL {:?}: {}", file_ref, url, e);
        return Err(StudyreelError::Resolution(file_ref.to_string()));
    }

    debug!("File {} resolved (provider size: {:?} bytes)", file_ref, file.bytes);
    Ok(url)
}
