//! CLI output formatting utilities.

use crate::artifact::LocalArtifact;
use crate::error::StudyreelError;
use crate::job::{GenerationTask, TaskStatus};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a failed command with advice matching the kind of failure.
    pub fn failure(err: &anyhow::Error) {
        Output::error(&format!("{}", err));
        if let Some(hint) = command_hint(err) {
            eprintln!("   {}", style(hint).dim());
        }
    }

    /// Print a task status snapshot.
    pub fn task(task: &GenerationTask) {
        let status = match task.status {
            TaskStatus::Completed => style(task.status.to_string()).green().bold(),
            TaskStatus::Failed => style(task.status.to_string()).red().bold(),
            _ => style(task.status.to_string()).yellow(),
        };
        Output::kv("Task", &task.task_id);
        Output::kv("Status", &format!("{} ({})", status, task.raw_status));
        if let Some(file_ref) = &task.file_ref {
            Output::kv("File", file_ref);
        }
        if let Some(error) = &task.error {
            Output::kv("Error", error);
        }
    }

    /// Print a saved artifact.
    pub fn artifact(artifact: &LocalArtifact) {
        Output::success(&format!(
            "Saved {} ({})",
            artifact.path.display(),
            format_bytes(artifact.size_bytes)
        ));
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Advice for a command error, if it carries a studyreel failure.
pub fn command_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.downcast_ref::<StudyreelError>().and_then(failure_hint)
}

/// Advice for a failure, so each kind reads differently to the user.
pub fn failure_hint(err: &StudyreelError) -> Option<&'static str> {
    match err {
        StudyreelError::Authentication(_) => {
            Some("Check that MINIMAX_API_KEY is set to a valid key.")
        }
        StudyreelError::Permission(_) => {
            Some("The account cannot use this model right now (plan or balance).")
        }
        StudyreelError::NotFound(_) => {
            Some("The provider endpoint is unreachable or missing; check provider.base_url in the config.")
        }
        StudyreelError::Http(_) | StudyreelError::Transport(_) => {
            Some("Could not reach the provider; check your network connection and try again.")
        }
        StudyreelError::UnexpectedResponse(_) => {
            Some("The provider answered in an unexpected shape; run with -vv for details.")
        }
        StudyreelError::ProviderFailure { .. } => {
            Some("The provider could not process this input. Rephrase the prompt and try again.")
        }
        StudyreelError::Resolution(_) => {
            Some("The task finished but its file has no download link; try `studyreel download <task_id>` later.")
        }
        StudyreelError::Download(_) => {
            Some("Download links expire quickly; rerun `studyreel download <task_id>` to get a fresh one.")
        }
        StudyreelError::Timeout { .. } => {
            Some("Generation is still running. Check later with `studyreel download <task_id> --wait`.")
        }
        StudyreelError::Cancelled { .. } => {
            Some("The task keeps running remotely; resume with `studyreel download <task_id> --wait`.")
        }
        StudyreelError::TaskNotReady { .. } => Some("Add --wait to keep polling until it finishes."),
        StudyreelError::Config(_) => Some("Run 'studyreel doctor' for detailed diagnostics."),
        _ => None,
    }
}

/// Format a byte count for display.
fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let b = bytes as f64;
    if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(1_164_000), "1.11 MB");
    }

    #[test]
    fn test_timeout_and_failure_hints_differ() {
        let timeout = StudyreelError::Timeout {
            task_id: "t".into(),
            waited: Duration::from_secs(600),
        };
        let failure = StudyreelError::ProviderFailure {
            task_id: "t".into(),
            message: "rejected".into(),
        };
        let cancelled = StudyreelError::Cancelled { task_id: "t".into() };

        let hints = [
            failure_hint(&timeout).unwrap(),
            failure_hint(&failure).unwrap(),
            failure_hint(&cancelled).unwrap(),
        ];
        assert_ne!(hints[0], hints[1]);
        assert_ne!(hints[0], hints[2]);
        assert!(hints[0].contains("later"));
    }

    #[test]
    fn test_command_hint_sees_through_anyhow() {
        let err = anyhow::Error::from(StudyreelError::NotFound("create task".into()));
        assert!(command_hint(&err).unwrap().contains("base_url"));

        let err = anyhow::anyhow!("Unknown video style: funky");
        assert!(command_hint(&err).is_none());
    }
}
