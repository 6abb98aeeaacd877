//! ClassDesk Core
//!
//! Credential resolution and tool dispatch for a classroom LLM toolbox.
//! This crate is runtime-agnostic; the `classdesk` binary is one front-end,
//! and any other presentation layer can drive the same [`ConfigurationGate`].
//!
//! ## Flow
//!
//! ```rust,ignore
//! use classdesk_core::{ConfigurationGate, SessionState, ToolInput};
//!
//! let mut session = SessionState::new();
//! let resolution = gate.refresh(&mut session).await;
//! render(&resolution.display);
//!
//! if !gate.status(&session).is_configured() {
//!     gate.submit(&mut session, api_key, api_endpoint).await?;
//! }
//!
//! let input = ToolInput::new().with("topic", "photosynthesis");
//! let outcome = gate.invoke(&session, "concept_explainer", &input).await?;
//! ```
//!
//! Credential precedence is static secrets, then the remote encrypted
//! config, then the session cache, then manual entry. See [`resolver`].

pub mod types;
pub mod session;
pub mod secrets;
pub mod logging;
pub mod remote;
pub mod resolver;
pub mod providers;
pub mod tools;
pub mod gate;
pub mod config;

// Re-export commonly used types
pub use types::{
    CredentialField, CredentialPair, CredentialSource, DisplayPolicy, FieldDisplay, FieldError, ValidCredentials,
};

pub use session::{CachedCredentials, SessionState};

pub use secrets::{
    ChainSecretStore, EnvSecretStore, FileSecretStore, MemorySecretStore, SecretStore, SecretStoreError,
    SecretStoreResult, StaticCredentials,
};

pub use logging::{Logger, MemoryLogger, NoOpLogger, SharedLogger, TracingLogger};

pub use remote::{ConfigError, ConfigFetcher, ConfigKey, SecureConfigFetcher};

pub use resolver::{CredentialResolver, RemoteSource, Resolution};

pub use providers::{GenerationOptions, HttpModelClient, MockModelClient, ModelClient, ProviderError};

pub use tools::{
    RegistryError, RenderedOutput, ToolDescriptor, ToolError, ToolHandler, ToolInfo, ToolInput, ToolOutcome,
    ToolRegistry,
};

pub use gate::{ConfigurationGate, GateError, GateStatus};

pub use config::{Settings, SettingsError};
