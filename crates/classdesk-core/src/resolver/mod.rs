//! Credential resolution
//!
//! `CredentialResolver` picks the working pair for a session from static
//! secrets, the remote encrypted config, the session cache, or manual entry,
//! and returns the display policy the presentation layer must honor.

mod credential_resolver;

pub use credential_resolver::{CredentialResolver, RemoteSource, Resolution, DEFAULT_DECRYPTION_KEY_ENV};
