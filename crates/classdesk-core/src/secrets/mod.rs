//! Static secret storage abstractions and implementations
//!
//! This module provides a pluggable, namespaced secret storage system with:
//! - `SecretStore` trait for implementing custom stores
//! - Built-in implementations: `EnvSecretStore`, `FileSecretStore`, `MemorySecretStore`, `ChainSecretStore`
//! - `StaticCredentials`, which turns a namespace into a credential pair

mod traits;
mod env_store;
mod file_store;
mod memory_store;
mod chain_store;
mod static_source;

pub use traits::{SecretStore, SecretStoreError, SecretStoreResult, API_KEY, API_ENDPOINT};
pub use env_store::EnvSecretStore;
pub use file_store::FileSecretStore;
pub use memory_store::MemorySecretStore;
pub use chain_store::ChainSecretStore;
pub use static_source::{StaticCredentials, DEFAULT_NAMESPACE};
