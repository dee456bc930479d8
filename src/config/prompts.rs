//! Prompt templates for video generation.
//!
//! Prompts can be customized by placing a `video.toml` file in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Presentation style for a generated study video.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VideoStyle {
    /// Step-by-step explanation with supporting graphics (default).
    #[default]
    Educational,
    /// Short animated breakdown of a topic.
    Explainer,
    /// Hands-on walkthrough with worked examples.
    Tutorial,
}

impl std::str::FromStr for VideoStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "educational" => Ok(VideoStyle::Educational),
            "explainer" => Ok(VideoStyle::Explainer),
            "tutorial" => Ok(VideoStyle::Tutorial),
            _ => Err(format!("Unknown video style: {}", s)),
        }
    }
}

impl std::fmt::Display for VideoStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoStyle::Educational => write!(f, "educational"),
            VideoStyle::Explainer => write!(f, "explainer"),
            VideoStyle::Tutorial => write!(f, "tutorial"),
        }
    }
}

/// Templates used to turn a study question into a video prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoPrompts {
    /// Opening sentence, receives `{{topic}}`.
    pub base: String,
    /// Appended when extra context is given, receives `{{context}}`.
    pub context: String,
    pub educational: String,
    pub explainer: String,
    pub tutorial: String,
    /// Closing sentence appended to every prompt.
    pub closing: String,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

impl Default for VideoPrompts {
    fn default() -> Self {
        Self {
            base: "Create an educational video explaining {{topic}}".to_string(),
            context: ". Context: {{context}}".to_string(),
            educational: "Use clear visuals, step-by-step explanations, and engaging graphics to help students understand the concept.".to_string(),
            explainer: "Create a concise explainer video with animations and clear narration that breaks down the topic into simple parts.".to_string(),
            tutorial: "Make a hands-on tutorial style video showing practical examples and demonstrations.".to_string(),
            closing: "The video should be engaging, clear, and suitable for learning purposes.".to_string(),
            variables: HashMap::new(),
        }
    }
}

impl VideoPrompts {
    /// Load prompts, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = VideoPrompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string()).join("video.toml");
            if custom_path.exists() {
                let content = std::fs::read_to_string(&custom_path)?;
                prompts = toml::from_str(&content)?;
            }
        }

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        Ok(prompts)
    }

    /// Build the generation prompt for a topic.
    pub fn build(&self, topic: &str, context: Option<&str>, style: VideoStyle) -> String {
        let mut vars = HashMap::new();
        vars.insert("topic".to_string(), topic.trim().to_string());

        let mut prompt = self.render_with_custom(&self.base, &vars);

        if let Some(ctx) = context.map(str::trim).filter(|c| !c.is_empty()) {
            vars.insert("context".to_string(), ctx.to_string());
            prompt.push_str(&self.render_with_custom(&self.context, &vars));
        }

        let style_text = match style {
            VideoStyle::Educational => &self.educational,
            VideoStyle::Explainer => &self.explainer,
            VideoStyle::Tutorial => &self.tutorial,
        };

        format!(
            "{}. {} {}",
            prompt,
            self.render_with_custom(style_text, &vars),
            self.render_with_custom(&self.closing, &vars)
        )
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
