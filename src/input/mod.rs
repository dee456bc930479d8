//! Study question input handling.
//!
//! A question arrives either as direct text or as a path to a text file.
//! PDFs and images are recognized so they can be rejected with a clear message.

mod exercise;

pub use exercise::{parse_exercise_sheet, ExerciseParser, Question};

use crate::error::{Result, StudyreelError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Kind of input file, judged by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Pdf,
    Image,
    Unknown,
}

impl InputKind {
    /// Detect the kind of a file from its extension.
    pub fn detect(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "txt" | "md" => InputKind::Text,
            "pdf" => InputKind::Pdf,
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" => InputKind::Image,
            _ => InputKind::Unknown,
        }
    }
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputKind::Text => write!(f, "text"),
            InputKind::Pdf => write!(f, "pdf"),
            InputKind::Image => write!(f, "image"),
            InputKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Read the study material named by `input`.
///
/// An existing path is read as a file; anything else is taken as the question text itself.
pub fn load_input(input: &str) -> Result<String> {
    let path = Path::new(input);
    if !path.is_file() {
        debug!("Treating input as direct text");
        return Ok(input.to_string());
    }

    match InputKind::detect(path) {
        InputKind::Text => {
            debug!("Reading text file {}", path.display());
            Ok(std::fs::read_to_string(path)?)
        }
        kind @ (InputKind::Pdf | InputKind::Image) => Err(StudyreelError::InvalidInput(format!(
            "{} input is not supported; extract the text first and pass a .txt file",
            kind
        ))),
        InputKind::Unknown => Err(StudyreelError::InvalidInput(format!(
            "unsupported file type: {}",
            path.display()
        ))),
    }
}

/// Pick question `number` (1-based position) from `content`, defaulting to the first.
pub fn select_question(content: &str, number: Option<usize>) -> Result<Question> {
    let mut questions = parse_exercise_sheet(content);
    if questions.is_empty() {
        return Err(StudyreelError::InvalidInput("no question found in input".into()));
    }

    let index = number.unwrap_or(1);
    if index == 0 || index > questions.len() {
        return Err(StudyreelError::InvalidInput(format!(
            "question {} requested but the input has {}",
            index,
            questions.len()
        )));
    }

    Ok(questions.swap_remove(index - 1))
}
