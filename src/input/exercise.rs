//! Splitting exercise sheets into individual questions.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One question pulled out of an exercise sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Number as written on the sheet.
    pub number: String,
    pub text: String,
}

/// Recognizes numbered questions in free-form text.
pub struct ExerciseParser {
    /// Heading patterns, tried in order. The first that matches anything wins.
    headings: Vec<Regex>,
}

impl ExerciseParser {
    pub fn new() -> Self {
        let headings = [
            // "1." or "1)" at the start of a line; whitespace must follow so "3.14" is not a heading
            r"(?m)^[ \t]*(\d+)[.)]\s+",
            // "Question 1:" / "Question 1."
            r"(?mi)^[ \t]*question\s+(\d+)[:.]\s*",
            // "Problem 1:" / "Problem 1."
            r"(?mi)^[ \t]*problem\s+(\d+)[:.]\s*",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid regex"))
        .collect();

        Self { headings }
    }

    /// Split `content` into questions.
    ///
    /// Text without any recognizable heading becomes a single question numbered "1".
    /// Blank content yields no questions.
    pub fn parse(&self, content: &str) -> Vec<Question> {
        if content.trim().is_empty() {
            return Vec::new();
        }

        for heading in &self.headings {
            let questions = Self::split_on(heading, content);
            if !questions.is_empty() {
                return questions;
            }
        }

        vec![Question {
            number: "1".to_string(),
            text: content.trim().to_string(),
        }]
    }

    fn split_on(heading: &Regex, content: &str) -> Vec<Question> {
        let starts: Vec<(usize, usize, String)> = heading
            .captures_iter(content)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let number = caps.get(1)?.as_str().to_string();
                Some((whole.start(), whole.end(), number))
            })
            .collect();

        starts
            .iter()
            .enumerate()
            .filter_map(|(i, (_, body_start, number))| {
                let body_end = starts.get(i + 1).map_or(content.len(), |next| next.0);
                let text = content[*body_start..body_end].trim();
                (!text.is_empty()).then(|| Question {
                    number: number.clone(),
                    text: text.to_string(),
                })
            })
            .collect()
    }
}

impl Default for ExerciseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Split exercise sheet content into individual questions.
pub fn parse_exercise_sheet(content: &str) -> Vec<Question> {
    ExerciseParser::new().parse(content)
}
