//! Tool registry: ordered name → handler dispatch table
//!
//! The registry is built once at startup and is read-only afterwards, so a
//! single `Arc<ToolRegistry>` can serve any number of sessions. Every handler
//! runs inside a failure boundary: returned errors and panics alike become a
//! [`ToolFailure`] shown for that tool alone.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use thiserror::Error;

use super::builtin;
use super::handler::{RenderedOutput, ToolContext, ToolDescriptor, ToolError, ToolHandler, ToolInput};
use crate::logging::Logger;
use crate::{log_error, log_info};
use crate::providers::{GenerationOptions, ModelClient, GENERIC_FAILURE_MESSAGE};
use crate::types::ValidCredentials;

/// Registry misuse; these are configuration bugs and should fail fast
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool already registered: {0}")]
    DuplicateName(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// Why a tool run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing or invalid user input
    InvalidInput,
    /// The remote model could not be reached or answered badly
    Model,
    /// The handler itself failed or panicked
    Internal,
}

/// A tool-specific failure, already phrased for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolFailure {
    pub tool: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Result of invoking a registered tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Rendered(RenderedOutput),
    Failed(ToolFailure),
}

impl ToolOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, ToolOutcome::Rendered(_))
    }

    pub fn rendered(&self) -> Option<&RenderedOutput> {
        match self {
            ToolOutcome::Rendered(output) => Some(output),
            ToolOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ToolFailure> {
        match self {
            ToolOutcome::Rendered(_) => None,
            ToolOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// Information about a registered tool, in registration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInfo {
    pub name: String,
    pub descriptor: ToolDescriptor,
}

struct ToolEntry {
    name: String,
    handler: Arc<dyn ToolHandler>,
}

/// Ordered registry of tools sharing one model client
pub struct ToolRegistry {
    entries: Vec<ToolEntry>,
    index: HashMap<String, usize>,
    model: Arc<dyn ModelClient>,
    generation: GenerationOptions,
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new(model: Arc<dyn ModelClient>, generation: GenerationOptions, logger: Arc<dyn Logger>) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            model,
            generation,
            logger,
        }
    }

    /// Build a registry from an ordered list of built-in tool names
    ///
    /// Order is preserved exactly; an unknown or repeated name is an error.
    pub fn from_catalog<I, S>(
        names: I,
        model: Arc<dyn ModelClient>,
        generation: GenerationOptions,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new(model, generation, logger);
        for name in names {
            let name = name.as_ref();
            let handler = builtin::create(name).ok_or_else(|| RegistryError::UnknownTool(name.to_string()))?;
            registry.register(name, handler)?;
        }
        Ok(registry)
    }

    /// Add a tool at the end of the list
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn ToolHandler>) -> Result<(), RegistryError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push(ToolEntry { name, handler });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Tools with their descriptors, in registration order
    pub fn tools(&self) -> Vec<ToolInfo> {
        self.entries
            .iter()
            .map(|e| ToolInfo {
                name: e.name.clone(),
                descriptor: e.handler.descriptor(),
            })
            .collect()
    }

    /// Run one tool
    ///
    /// Only an unknown name is an `Err`; anything that goes wrong inside the
    /// handler comes back as [`ToolOutcome::Failed`].
    pub async fn invoke(
        &self,
        name: &str,
        credentials: &ValidCredentials,
        input: &ToolInput,
    ) -> Result<ToolOutcome, RegistryError> {
        let entry = self
            .index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))?;

        log_info!(self.logger, "[ToolRegistry] Invoking tool: {}", name);

        let ctx = ToolContext {
            tool: &entry.name,
            credentials,
            model: self.model.as_ref(),
            generation: &self.generation,
        };

        let result = AssertUnwindSafe(entry.handler.run(&ctx, input))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(Ok(output)) => ToolOutcome::Rendered(output),
            Ok(Err(e)) => ToolOutcome::Failed(self.failure_from_error(name, e)),
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                log_error!(self.logger, "[ToolRegistry] Tool '{}' panicked: {}", name, detail);
                ToolOutcome::Failed(ToolFailure {
                    tool: name.to_string(),
                    kind: FailureKind::Internal,
                    message: format!("An error occurred in this tool: {}", detail),
                })
            }
        };
        Ok(outcome)
    }

    fn failure_from_error(&self, name: &str, error: ToolError) -> ToolFailure {
        let (kind, message) = match &error {
            ToolError::InvalidInput(message) => (FailureKind::InvalidInput, message.clone()),
            ToolError::Model(e) => {
                log_error!(self.logger, "[ToolRegistry] Tool '{}' model call failed: {}", name, e);
                (FailureKind::Model, GENERIC_FAILURE_MESSAGE.to_string())
            }
            ToolError::Failed(message) => {
                log_error!(self.logger, "[ToolRegistry] Tool '{}' failed: {}", name, message);
                (FailureKind::Internal, format!("An error occurred in this tool: {}", message))
            }
        };
        ToolFailure {
            tool: name.to_string(),
            kind,
            message,
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .field("model", &self.model.name())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}
