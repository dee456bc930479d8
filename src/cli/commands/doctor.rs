//! Doctor command - verify credentials and configuration.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::{Credentials, Settings, API_KEY_VAR, GROUP_ID_VAR};
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("studyreel doctor");
    println!();

    let mut checks = Vec::new();

    println!("{}", style("Credentials").bold());
    let credential_checks = check_credentials(
        std::env::var(API_KEY_VAR).ok(),
        std::env::var(GROUP_ID_VAR).ok(),
    );
    for check in &credential_checks {
        check.print();
    }
    checks.extend(credential_checks);

    println!();

    println!("{}", style("Output").bold());
    let dir_check = check_output_dir(&settings.output_dir());
    dir_check.print();
    checks.push(dir_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);
    Output::kv("Provider", &settings.provider.base_url);
    Output::kv("Model", &settings.provider.model);
    Output::kv(
        "Polling",
        &format!(
            "every {}s while generating, {}s when downloading, up to {}s",
            settings.polling.generate_interval_secs,
            settings.polling.download_interval_secs,
            settings.polling.max_wait_secs
        ),
    );

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before generating videos.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! studyreel is ready to use.");
    }

    Ok(())
}

/// Check the provider credentials.
fn check_credentials(api_key: Option<String>, group_id: Option<String>) -> Vec<CheckResult> {
    let key_check = match api_key {
        Some(key) if key.trim().is_empty() => CheckResult::error(
            API_KEY_VAR,
            "empty",
            &format!("Set with: export {API_KEY_VAR}='...'"),
        ),
        Some(key) => {
            let credentials = Credentials::new(key, None);
            CheckResult::ok(
                API_KEY_VAR,
                &format!("configured ({})", mask(&credentials.api_key)),
            )
        }
        None => CheckResult::error(
            API_KEY_VAR,
            "not set",
            &format!("Set with: export {API_KEY_VAR}='...'"),
        ),
    };

    let group_check = match group_id.filter(|g| !g.trim().is_empty()) {
        Some(group) => CheckResult::ok(GROUP_ID_VAR, &format!("configured ({})", group)),
        None => CheckResult::warning(
            GROUP_ID_VAR,
            "not set",
            "Only needed for accounts that require a group id",
        ),
    };

    vec![key_check, group_check]
}

/// Show only the ends of a secret.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Check that videos can be written to the output directory.
fn check_output_dir(dir: &Path) -> CheckResult {
    match preflight::check_output_dir(dir) {
        Ok(()) => CheckResult::ok("Output directory", &format!("{} (writable)", dir.display())),
        Err(e) => CheckResult::error(
            "Output directory",
            &e.to_string(),
            "Set general.output_dir in the config or pass --output-dir",
        ),
    }
}

/// Check if config file exists.
fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: studyreel config init",
        )
    }
}
