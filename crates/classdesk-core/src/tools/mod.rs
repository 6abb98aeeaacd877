//! Tools module
//!
//! A tool is a self-contained handler that turns user input into rendered
//! output using the session's validated credentials. The [`ToolRegistry`]
//! owns the name → handler mapping and isolates failures per tool.
//!
//! ```text
//! ConfigurationGate ──(ValidCredentials)──▶ ToolRegistry::invoke(name)
//!                                               │
//!                                               ▼
//!                                    ToolHandler::run(ctx, input)
//!                                               │
//!                                               ▼
//!                                    ModelClient::complete(prompt)
//! ```

mod handler;
mod registry;
pub mod builtin;

pub use handler::{
    FieldKind, InputField, RenderedOutput, ToolContext, ToolDescriptor, ToolError, ToolHandler, ToolInput,
};
pub use registry::{FailureKind, RegistryError, ToolFailure, ToolInfo, ToolOutcome, ToolRegistry};
