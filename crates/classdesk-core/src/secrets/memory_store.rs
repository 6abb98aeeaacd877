//! In-memory secret store

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::SecretStore;

type Bundle = HashMap<String, HashMap<String, String>>;

/// In-memory secret store for testing and embedding
///
/// Secrets are lost when the store is dropped.
///
/// # Example
///
/// ```
/// use classdesk_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.insert("llm", "API_KEY", "sk-test");
/// assert_eq!(store.get("llm", "API_KEY"), Some("sk-test".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    namespaces: RwLock<Bundle>,
}

impl MemorySecretStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory store with initial values
    pub fn with_namespaces(initial: Bundle) -> Self {
        Self {
            namespaces: RwLock::new(initial),
        }
    }

    /// Shortcut for a store holding one namespace with both credential keys
    pub fn with_credentials(namespace: &str, api_key: &str, api_endpoint: &str) -> Self {
        let store = Self::new();
        store.insert(namespace, super::API_KEY, api_key);
        store.insert(namespace, super::API_ENDPOINT, api_endpoint);
        store
    }

    pub fn insert(&self, namespace: &str, key: &str, value: &str) {
        self.namespaces
            .write()
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Create an empty namespace (present, but without keys)
    pub fn insert_namespace(&self, namespace: &str) {
        self.namespaces.write().entry(namespace.to_string()).or_default();
    }

    pub fn remove(&self, namespace: &str, key: &str) {
        if let Some(ns) = self.namespaces.write().get_mut(namespace) {
            ns.remove(key);
        }
    }

    /// Clear all secrets from the store
    pub fn clear(&self) {
        self.namespaces.write().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.read().is_empty()
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces.read().contains_key(namespace)
    }

    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        self.namespaces
            .read()
            .get(namespace)
            .and_then(|ns| ns.get(key))
            .cloned()
    }
}
