//! Pre-flight checks before talking to the provider.
//!
//! Catches missing credentials and an unwritable output directory before a
//! generation task is created, so nothing is submitted that cannot be saved.

use crate::config::{Credentials, Settings};
use crate::error::{Result, StudyreelError};
use std::path::Path;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Creating a task and saving its video needs credentials and a writable output directory.
    Generate,
    /// Downloading an existing task needs the same as generating.
    Download,
    /// A single status query needs credentials only.
    Status,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, output_dir: Option<&Path>) -> Result<()> {
    Credentials::from_env()?;

    match operation {
        Operation::Generate | Operation::Download => {
            if let Some(dir) = output_dir {
                check_output_dir(dir)?;
            }
        }
        Operation::Status => {}
    }
    Ok(())
}

/// Resolve the output directory a command will write to.
pub fn output_dir_for(settings: &Settings, flag: Option<&str>) -> std::path::PathBuf {
    match flag {
        Some(dir) => Settings::expand_path(dir),
        None => settings.output_dir(),
    }
}

/// Make sure `dir` exists (creating it if needed) and accepts new files.
pub fn check_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        StudyreelError::Config(format!("cannot create output directory {}: {}", dir.display(), e))
    })?;

    tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        StudyreelError::Config(format!("output directory {} is not writable: {}", dir.display(), e))
    })?;
    Ok(())
}
