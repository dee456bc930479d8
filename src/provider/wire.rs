//! Response parsing helpers for the provider's JSON envelopes.
//!
//! Provider responses are not consistent about field names, so every lookup
//! goes through an ordered list of accepted names. The first present,
//! non-empty field wins.

use crate::error::{Result, StudyreelError};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// Accepted names for the task identifier.
pub const TASK_ID_FIELDS: &[&str] = &["task_id", "taskId", "id"];
/// Accepted names for the task status.
pub const STATUS_FIELDS: &[&str] = &["status", "state"];
/// Accepted names for the generated file reference.
pub const FILE_ID_FIELDS: &[&str] = &["file_id", "fileId"];
/// Accepted names for the resolved download URL.
pub const DOWNLOAD_URL_FIELDS: &[&str] = &["download_url", "downloadUrl", "url"];
/// Accepted names for a provider failure reason.
pub const ERROR_FIELDS: &[&str] = &["error_message", "error", "message"];

/// Status codes in `base_resp` that mean the key was rejected.
const AUTH_CODES: &[i64] = &[1004, 2049];
/// Status codes in `base_resp` that mean the account cannot do this.
const PERMISSION_CODES: &[i64] = &[1008];
/// Status codes in `base_resp` that mean "slow down".
const RATE_LIMIT_CODES: &[i64] = &[1002];

/// The `base_resp` envelope attached to every provider response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BaseResp {
    #[serde(default)]
    pub status_code: i64,
    #[serde(default)]
    pub status_msg: String,
}

impl BaseResp {
    /// Extract the envelope from a response body, if present.
    pub fn from_body(body: &Value) -> Option<Self> {
        body.get("base_resp")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Return the first non-empty string (or number rendered as a string) among `fields`.
pub fn first_string(body: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match body.get(*field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Map a non-success HTTP status to an error kind.
pub fn check_http_status(status: StatusCode, body: &str, context: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    let detail = format!("{context}: HTTP {} {}", status.as_u16(), preview(body));
    Err(match status {
        StatusCode::UNAUTHORIZED => StudyreelError::Authentication(detail),
        StatusCode::FORBIDDEN => StudyreelError::Permission(detail),
        StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED => StudyreelError::NotFound(detail),
        StatusCode::TOO_MANY_REQUESTS => StudyreelError::RateLimited(detail),
        s if s.is_server_error() => StudyreelError::Transport(detail),
        _ => StudyreelError::UnexpectedResponse(detail),
    })
}

/// Map a non-zero `base_resp.status_code` to an error kind.
pub fn check_base_resp(body: &Value, context: &str) -> Result<()> {
    let Some(base) = BaseResp::from_body(body) else {
        return Ok(());
    };
    if base.status_code == 0 {
        return Ok(());
    }

    let detail = format!(
        "{context}: provider returned status_code {} ({})",
        base.status_code, base.status_msg
    );
    Err(if AUTH_CODES.contains(&base.status_code) {
        StudyreelError::Authentication(detail)
    } else if PERMISSION_CODES.contains(&base.status_code) {
        StudyreelError::Permission(detail)
    } else if RATE_LIMIT_CODES.contains(&base.status_code) {
        StudyreelError::RateLimited(detail)
    } else {
        StudyreelError::UnexpectedResponse(detail)
    })
}

/// Truncate a response body for inclusion in an error message.
pub fn preview(body: &str) -> String {
    const MAX: usize = 200;
    let body = body.trim();
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX).collect();
        format!("{}...", cut)
    }
}
