//! Status command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the status command.
pub async fn run_status(task_id: &str, json: bool, settings: Settings) -> Result<()> {
    preflight::check(Operation::Status, None)?;

    let orchestrator = Orchestrator::new(settings)?;
    let task = orchestrator.status(task_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        Output::header("Task Status");
        Output::task(&task);
    }
    Ok(())
}
