//! Configuration settings for studyreel.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub provider: ProviderSettings,
    pub polling: PollingSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory downloaded videos are written to.
    pub output_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            output_dir: "videos".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Video generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Base URL of the provider API, without a trailing slash.
    pub base_url: String,
    /// Video model to request.
    pub model: String,
    /// Aspect ratio sent with each request (e.g. "16:9").
    pub aspect_ratio: String,
    /// Output resolution sent with each request (e.g. "768P").
    pub resolution: String,
    /// Clip length used when the caller does not specify one.
    pub default_duration_seconds: u32,
    /// Let the provider rewrite prompts before generation.
    pub prompt_optimizer: bool,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: crate::provider::DEFAULT_BASE_URL.to_string(),
            model: "MiniMax-Hailuo-02".to_string(),
            aspect_ratio: "16:9".to_string(),
            resolution: "768P".to_string(),
            default_duration_seconds: 6,
            prompt_optimizer: true,
        }
    }
}

/// Status polling and request timeout settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Seconds between status queries while generating a new video.
    pub generate_interval_secs: u64,
    /// Seconds between status queries when waiting on an existing task.
    pub download_interval_secs: u64,
    /// Upper bound on how long a single poll loop may run.
    pub max_wait_secs: u64,
    /// Timeout for task creation, status and file lookups.
    pub request_timeout_secs: u64,
    /// Timeout for downloading the finished artifact.
    pub download_timeout_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            generate_interval_secs: 3,
            download_interval_secs: 15,
            max_wait_secs: 600, // 10 minutes
            request_timeout_secs: 30,
            download_timeout_secs: 300,
        }
    }
}

impl PollingSettings {
    pub fn generate_interval(&self) -> Duration {
        Duration::from_secs(self.generate_interval_secs)
    }

    pub fn download_interval(&self) -> Duration {
        Duration::from_secs(self.download_interval_secs)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            settings.validate()?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Reject values the poller and client cannot work with.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::StudyreelError;

        if self.provider.base_url.trim().is_empty() {
            return Err(StudyreelError::Config("provider.base_url is empty".into()));
        }
        if self.polling.generate_interval_secs == 0 || self.polling.download_interval_secs == 0 {
            return Err(StudyreelError::Config(
                "polling intervals must be at least one second".into(),
            ));
        }
        if self.polling.max_wait_secs == 0 {
            return Err(StudyreelError::Config("polling.max_wait_secs must be positive".into()));
        }
        Ok(())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::StudyreelError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("studyreel")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }
}
