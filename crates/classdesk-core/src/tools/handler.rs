//! Tool handler trait and the values flowing through it

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::{GenerationOptions, ModelClient, ProviderError};
use crate::types::ValidCredentials;

/// Kind of an input field, so a front-end knows which widget to draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Single line of text
    Text,
    /// Multi-line text
    LongText,
    /// One of a fixed list of options
    Choice { options: Vec<String> },
    /// Integer in `min..=max`
    Range { min: i64, max: i64, default: i64 },
}

/// One input a tool asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl InputField {
    pub fn text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::Text, true)
    }

    pub fn long_text(name: &str, label: &str) -> Self {
        Self::new(name, label, FieldKind::LongText, true)
    }

    pub fn choice(name: &str, label: &str, options: &[&str]) -> Self {
        Self::new(
            name,
            label,
            FieldKind::Choice {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
            false,
        )
    }

    pub fn range(name: &str, label: &str, min: i64, max: i64, default: i64) -> Self {
        Self::new(name, label, FieldKind::Range { min, max, default }, false)
    }

    fn new(name: &str, label: &str, kind: FieldKind, required: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required,
        }
    }
}

/// What a tool tells the front-end about itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub title: String,
    pub description: String,
    pub fields: Vec<InputField>,
}

/// Named user inputs for one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInput {
    values: BTreeMap<String, String>,
}

impl ToolInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|v| v.as_str())
    }

    /// Trimmed text, empty when absent
    pub fn text(&self, name: &str) -> &str {
        self.get(name).map(str::trim).unwrap_or("")
    }

    /// Trimmed text that must not be empty
    pub fn required_text(&self, name: &str, missing_message: &str) -> Result<&str, ToolError> {
        let value = self.text(name);
        if value.is_empty() {
            Err(ToolError::InvalidInput(missing_message.to_string()))
        } else {
            Ok(value)
        }
    }

    /// Index of the selected option; the first option when absent
    ///
    /// Accepts the option text (case-insensitive) or its 1-based number.
    pub fn choice(&self, name: &str, options: &[&str]) -> Result<usize, ToolError> {
        let value = self.text(name);
        if value.is_empty() {
            return Ok(0);
        }
        if let Some(idx) = options.iter().position(|o| o.eq_ignore_ascii_case(value)) {
            return Ok(idx);
        }
        match value.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => Ok(n - 1),
            _ => Err(ToolError::InvalidInput(format!(
                "'{}' is not one of: {}",
                value,
                options.join(", ")
            ))),
        }
    }

    /// Integer within `min..=max`; `default` when absent
    pub fn range(&self, name: &str, min: i64, max: i64, default: i64) -> Result<i64, ToolError> {
        let value = self.text(name);
        if value.is_empty() {
            return Ok(default);
        }
        match value.parse::<i64>() {
            Ok(n) if (min..=max).contains(&n) => Ok(n),
            _ => Err(ToolError::InvalidInput(format!(
                "{} must be a whole number from {} to {}",
                name, min, max
            ))),
        }
    }
}

/// Output of a successful tool run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedOutput {
    pub title: String,
    /// Human-readable text or markdown
    pub body: String,
}

impl RenderedOutput {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Errors returned by a tool's own logic
#[derive(Error, Debug)]
pub enum ToolError {
    /// The user left something out or picked an invalid value
    #[error("{0}")]
    InvalidInput(String),

    /// The remote model call failed
    #[error("Model call failed: {0}")]
    Model(#[from] ProviderError),

    /// Anything else
    #[error("{0}")]
    Failed(String),
}

/// Everything a handler may use while running
///
/// Handlers own no shared state; everything arrives through here.
pub struct ToolContext<'a> {
    pub tool: &'a str,
    pub credentials: &'a ValidCredentials,
    pub model: &'a dyn ModelClient,
    pub generation: &'a GenerationOptions,
}

impl ToolContext<'_> {
    /// Send a prompt to the model with the session's credentials
    pub async fn query(&self, prompt: &str) -> Result<String, ToolError> {
        Ok(self.model.complete(self.credentials, prompt, self.generation).await?)
    }
}

/// A self-contained tool that turns user input into rendered output
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    async fn run(&self, ctx: &ToolContext<'_>, input: &ToolInput) -> Result<RenderedOutput, ToolError>;
}
