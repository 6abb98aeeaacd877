//! Model client trait definition

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ProviderResult;
use crate::types::ValidCredentials;

/// Generation parameters sent with every prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: f32,
    /// Maximum output length
    pub max_tokens: u32,
    /// Response JSON field holding the generated text
    pub response_field: String,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 512,
            response_field: "text".to_string(),
        }
    }
}

impl GenerationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set temperature
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_response_field(mut self, field: impl Into<String>) -> Self {
        self.response_field = field.into();
        self
    }
}

/// Opaque text-completion service
///
/// Takes [`ValidCredentials`] so an incomplete pair can never reach the
/// network.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Client name, for logs
    fn name(&self) -> &str;

    /// Send one prompt and return the generated text
    async fn complete(
        &self,
        credentials: &ValidCredentials,
        prompt: &str,
        options: &GenerationOptions,
    ) -> ProviderResult<String>;
}
