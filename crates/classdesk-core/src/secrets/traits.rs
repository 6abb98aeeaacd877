//! Core traits and types for static secret storage

use thiserror::Error;

/// Key under a namespace holding the API key
pub const API_KEY: &str = "API_KEY";
/// Key under a namespace holding the API endpoint
pub const API_ENDPOINT: &str = "API_ENDPOINT";

/// Errors that can occur while loading a secret store
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Store is read-only")]
    ReadOnly,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse secret bundle: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Trait for statically provisioned, namespaced secrets
///
/// Implementations:
/// - Environment variables (`EnvSecretStore`)
/// - A YAML secret bundle on disk (`FileSecretStore`)
/// - In-memory for testing (`MemorySecretStore`)
/// - Chained for fallback behavior (`ChainSecretStore`)
///
/// Lookups never touch the network and never fail: absence is `None`.
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Check if this store is available
    fn is_available(&self) -> bool {
        true
    }

    /// Whether the namespace exists at all, even with missing keys
    ///
    /// This is what separates "not configured" from "misconfigured".
    fn has_namespace(&self, namespace: &str) -> bool;

    /// Retrieve a secret by namespace and key
    fn get(&self, namespace: &str, key: &str) -> Option<String>;

    /// Check if a secret exists and is non-empty
    fn has(&self, namespace: &str, key: &str) -> bool {
        self.get(namespace, key).map(|v| !v.is_empty()).unwrap_or(false)
    }

    /// Retrieve several keys from one namespace, all or nothing
    ///
    /// Blank values count as missing.
    fn get_all(&self, namespace: &str, keys: &[&str]) -> Option<Vec<String>> {
        keys.iter()
            .map(|key| self.get(namespace, key).filter(|v| !v.trim().is_empty()))
            .collect()
    }
}
