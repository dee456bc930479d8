//! Provider credentials, read from the process environment only.

use crate::error::{Result, StudyreelError};

/// Environment variable holding the provider API key.
pub const API_KEY_VAR: &str = "MINIMAX_API_KEY";
/// Environment variable holding the optional grouping identifier.
pub const GROUP_ID_VAR: &str = "MINIMAX_GROUP_ID";

/// API key and optional group id for the video provider.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub group_id: Option<String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, group_id: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            group_id: group_id.filter(|g| !g.trim().is_empty()),
        }
    }

    /// Read credentials from the environment.
    ///
    /// A missing or blank API key is an error; nothing downstream runs without one.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = match lookup(API_KEY_VAR) {
            Some(key) if !key.trim().is_empty() => key.trim().to_string(),
            Some(_) => {
                return Err(StudyreelError::Config(format!(
                    "{API_KEY_VAR} is empty. Set it with: export {API_KEY_VAR}='...'"
                )))
            }
            None => {
                return Err(StudyreelError::Config(format!(
                    "{API_KEY_VAR} not set. Set it with: export {API_KEY_VAR}='...'"
                )))
            }
        };

        Ok(Self::new(api_key, lookup(GROUP_ID_VAR)))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("group_id", &self.group_id)
            .finish()
    }
}
