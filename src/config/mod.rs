//! Configuration module for studyreel.
//!
//! Handles loading settings, provider credentials and prompt templates.

mod credentials;
mod prompts;
mod settings;

pub use credentials::{Credentials, API_KEY_VAR, GROUP_ID_VAR};
pub use prompts::{VideoPrompts, VideoStyle};
pub use settings::{GeneralSettings, PollingSettings, PromptSettings, ProviderSettings, Settings};
