//! CLI module for studyreel.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

/// studyreel - Study videos from questions
///
/// Turns a study question into a short AI-generated video: submits the
/// generation task, waits for it to finish and downloads the clip.
#[derive(Parser, Debug)]
#[command(name = "studyreel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a video for a question, wait for it, and download it
    Generate {
        /// Question text, or path to a .txt/.md exercise sheet
        input: String,

        /// Clip length in seconds (clamped to 5-10)
        #[arg(short, long)]
        duration: Option<u32>,

        /// Video style (educational, explainer, tutorial)
        #[arg(short, long, default_value = "educational")]
        style: String,

        /// Extra context about the problem
        #[arg(long)]
        context: Option<String>,

        /// Which question of an exercise sheet to use (default: the first)
        #[arg(short, long)]
        question: Option<usize>,

        /// Send the input to the provider as-is, without the study-video prompt template
        #[arg(long)]
        raw: bool,

        /// Directory to save the video in
        #[arg(long, env = "STUDYREEL_OUTPUT_DIR")]
        output_dir: Option<String>,

        /// File name for the saved video (default: video_<task_id>_<timestamp>.mp4)
        #[arg(short, long)]
        filename: Option<String>,

        /// Stop once the task completes, without downloading
        #[arg(long)]
        no_download: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download the video of an existing generation task
    Download {
        /// Task id returned by the provider
        task_id: String,

        /// Poll until the task finishes instead of requiring it to be done already
        #[arg(short, long)]
        wait: bool,

        /// File name for the saved video
        #[arg(short, long)]
        output: Option<String>,

        /// Directory to save the video in
        #[arg(long, env = "STUDYREEL_OUTPUT_DIR")]
        output_dir: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the status of a generation task once
    Status {
        /// Task id returned by the provider
        task_id: String,

        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check credentials and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init,

    /// Show configuration file path
    Path,
}

/// Exit status for a run interrupted by a second Ctrl-C.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// A cancellation token that fires on the first Ctrl-C.
///
/// The first Ctrl-C lets the pipeline stop cleanly; a second one exits immediately.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        Output::warning("Cancelling... press Ctrl-C again to exit immediately.");
        trigger.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
    cancel
}
