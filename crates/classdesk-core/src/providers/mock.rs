//! Mock model client for testing
//!
//! Provides deterministic responses without network dependencies.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{ProviderError, ProviderResult};
use super::traits::{GenerationOptions, ModelClient};
use crate::logging::Logger;
use crate::types::ValidCredentials;

/// Mock response mode
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Echo back the prompt
    #[default]
    Echo,
    /// Return a fixed response
    Fixed(String),
    /// Fail every call
    Error(String),
}

/// Mock model client for tests and offline demos
pub struct MockModelClient {
    mode: MockMode,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
    logger: Arc<dyn Logger>,
}

impl MockModelClient {
    pub fn with_mode(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
            logger,
        }
    }

    /// Create an echo client (returns the prompt)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Echo, logger)
    }

    /// Create a fixed response client
    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Fixed(response.into()), logger)
    }

    /// Create an error-producing client
    pub fn error(message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Error(message.into()), logger)
    }

    /// Number of completed or failed calls so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().clone()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        _credentials: &ValidCredentials,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> ProviderResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock() = Some(prompt.to_string());
        self.logger.debug(&format!("[MockModelClient] prompt_len={}", prompt.len()));

        match &self.mode {
            MockMode::Echo => Ok(format!("Mock response for: {}", prompt)),
            MockMode::Fixed(response) => Ok(response.clone()),
            MockMode::Error(message) => Err(ProviderError::Other(message.clone())),
        }
    }
}

impl std::fmt::Debug for MockModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockModelClient")
            .field("mode", &self.mode)
            .field("calls", &self.call_count())
            .finish()
    }
}
