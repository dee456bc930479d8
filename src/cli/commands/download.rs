//! Download command implementation.

use super::generate::{progress_message, report};
use crate::cli::preflight::{self, Operation};
use crate::cli::{cancel_on_ctrl_c, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the download command.
pub async fn run_download(
    task_id: &str,
    wait: bool,
    output: Option<String>,
    output_dir: Option<String>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    let output_dir = preflight::output_dir_for(&settings, output_dir.as_deref());
    preflight::check(Operation::Download, Some(&output_dir))?;

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Checking task {}...", task_id));
    let result = orchestrator
        .fetch(
            task_id,
            wait,
            Some(output_dir),
            output.as_deref(),
            progress_message(&spinner),
            cancel_on_ctrl_c(),
        )
        .await;
    spinner.finish_and_clear();

    report(&result?, json)
}
