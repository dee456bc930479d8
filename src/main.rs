//! studyreel CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use studyreel::cli::{commands, Cli, Commands, Output};
use studyreel::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // Every failure is reported here, once
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Output::failure(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_ref().map(PathBuf::from);

    // Load configuration
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging; -v flags override the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("studyreel={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Generate {
            input,
            duration,
            style,
            context,
            question,
            raw,
            output_dir,
            filename,
            no_download,
            json,
        } => {
            let args = commands::GenerateArgs {
                input,
                duration,
                style,
                context,
                question,
                raw,
                output_dir,
                filename,
                no_download,
                json,
            };
            commands::run_generate(args, settings).await?;
        }

        Commands::Download {
            task_id,
            wait,
            output,
            output_dir,
            json,
        } => {
            commands::run_download(&task_id, wait, output, output_dir, json, settings).await?;
        }

        Commands::Status { task_id, json } => {
            commands::run_status(&task_id, json, settings).await?;
        }

        Commands::Doctor => {
            let path = config_path.unwrap_or_else(Settings::default_config_path);
            commands::run_doctor(&settings, &path)?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, config_path)?;
        }
    }

    Ok(())
}
