//! Generate command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{cancel_on_ctrl_c, Output};
use crate::config::{Settings, VideoStyle};
use crate::input::{load_input, select_question};
use crate::job::GenerationTask;
use crate::orchestrator::{GenerationOutcome, Orchestrator, VideoRequest};
use anyhow::Result;

/// Options for one `generate` run.
#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    pub input: String,
    pub duration: Option<u32>,
    pub style: String,
    pub context: Option<String>,
    pub question: Option<usize>,
    pub raw: bool,
    pub output_dir: Option<String>,
    pub filename: Option<String>,
    pub no_download: bool,
    pub json: bool,
}

/// Run the generate command.
pub async fn run_generate(args: GenerateArgs, settings: Settings) -> Result<()> {
    let output_dir = preflight::output_dir_for(&settings, args.output_dir.as_deref());
    let check_dir = (!args.no_download).then_some(output_dir.as_path());
    preflight::check(Operation::Generate, check_dir)?;

    let style: VideoStyle = args.style.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let content = load_input(&args.input)?;
    let question = select_question(&content, args.question)?;

    let orchestrator = Orchestrator::new(settings)?;
    let prompt = if args.raw {
        question.text.clone()
    } else {
        orchestrator.build_prompt(&question.text, args.context.as_deref(), style)
    };

    if !args.json {
        Output::info(&format!("Question {}: {}", question.number, question.text));
    }

    let request = VideoRequest {
        prompt,
        duration_seconds: args.duration,
        output_dir: Some(output_dir),
        filename: args.filename,
        skip_download: args.no_download,
    };

    let spinner = Output::spinner("Submitting generation task...");
    let result = orchestrator
        .generate(&request, progress_message(&spinner), cancel_on_ctrl_c())
        .await;
    spinner.finish_and_clear();

    report(&result?, args.json)
}

/// Spinner callback showing the latest task status.
pub(super) fn progress_message(spinner: &indicatif::ProgressBar) -> impl FnMut(&GenerationTask) + '_ {
    move |task: &GenerationTask| {
        spinner.set_message(format!("Task {}: {}", task.task_id, task.raw_status));
    }
}

/// Print a finished pipeline run.
pub(super) fn report(outcome: &GenerationOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    Output::header("Generation Result");
    Output::task(&outcome.task);
    if let Some(url) = &outcome.download_url {
        Output::kv("URL", url);
    }
    match &outcome.artifact {
        Some(artifact) => Output::artifact(artifact),
        None => Output::success(&format!(
            "Task {} completed. Fetch it later with: studyreel download {}",
            outcome.task.task_id, outcome.task.task_id
        )),
    }
    Ok(())
}
