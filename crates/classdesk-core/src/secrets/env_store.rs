//! Environment variable secret store

use std::env;

use super::traits::{SecretStore, API_ENDPOINT, API_KEY};

/// Secret store that reads from environment variables
///
/// This store is read-only. A secret `key` under `namespace` is read from
/// the variable `<NAMESPACE>_<KEY>` with the namespace upper-cased and
/// dashes or dots replaced by underscores:
/// - `("llm", "API_KEY")` → `LLM_API_KEY`
/// - `("llm", "API_ENDPOINT")` → `LLM_API_ENDPOINT`
///
/// # Example
///
/// ```
/// use classdesk_core::secrets::{SecretStore, EnvSecretStore};
///
/// let store = EnvSecretStore::new();
/// // store.get("llm", "API_KEY") will check LLM_API_KEY
/// ```
#[derive(Debug, Default)]
pub struct EnvSecretStore {
    _private: (), // Prevent direct construction, use new()
}

impl EnvSecretStore {
    /// Create a new environment variable secret store
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// The environment variable consulted for a namespaced key
    pub fn env_var_name(namespace: &str, key: &str) -> String {
        let ns = namespace.to_uppercase().replace(['-', '.'], "_");
        format!("{}_{}", ns, key.to_uppercase())
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn has_namespace(&self, namespace: &str) -> bool {
        [API_KEY, API_ENDPOINT]
            .iter()
            .any(|key| env::var_os(Self::env_var_name(namespace, key)).is_some())
    }

    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        match env::var(Self::env_var_name(namespace, key)) {
            Ok(value) if !value.is_empty() => Some(value),
            _ => None,
        }
    }
}
