//! Chained secret store with fallback behavior

use std::sync::Arc;

use super::traits::SecretStore;

/// A secret store that chains multiple stores together with fallback behavior
///
/// Lookups go to the first available store that holds the namespace. Keys
/// are never mixed across stores: a namespace found in the first store is
/// answered entirely by that store, even if a key is missing there.
/// [`SecretStore::get_all`] skips stores holding only part of the requested
/// keys and answers from the first complete one.
///
/// # Example
///
/// ```
/// use classdesk_core::secrets::{SecretStore, ChainSecretStore, EnvSecretStore, MemorySecretStore};
/// use std::sync::Arc;
///
/// let memory = Arc::new(MemorySecretStore::new());
/// let env = Arc::new(EnvSecretStore::new());
///
/// // Try memory first, then fall back to env
/// let chain = ChainSecretStore::new(vec![memory, env]);
/// assert!(!chain.has_namespace("nonexistent_chain_ns"));
/// ```
pub struct ChainSecretStore {
    stores: Vec<Arc<dyn SecretStore>>,
}

impl ChainSecretStore {
    /// Create a new chain store; stores are tried in order
    pub fn new(stores: Vec<Arc<dyn SecretStore>>) -> Self {
        Self { stores }
    }

    /// Get the stores in this chain
    pub fn stores(&self) -> &[Arc<dyn SecretStore>] {
        &self.stores
    }

    /// Find which store answers for a namespace
    pub fn find_store(&self, namespace: &str) -> Option<&Arc<dyn SecretStore>> {
        self.stores
            .iter()
            .find(|store| store.is_available() && store.has_namespace(namespace))
    }
}

impl SecretStore for ChainSecretStore {
    fn name(&self) -> &str {
        "chain"
    }

    fn is_available(&self) -> bool {
        // Chain is available if any store is available
        self.stores.iter().any(|s| s.is_available())
    }

    fn has_namespace(&self, namespace: &str) -> bool {
        self.find_store(namespace).is_some()
    }

    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        self.find_store(namespace)?.get(namespace, key)
    }

    fn get_all(&self, namespace: &str, keys: &[&str]) -> Option<Vec<String>> {
        self.stores
            .iter()
            .filter(|store| store.is_available() && store.has_namespace(namespace))
            .find_map(|store| store.get_all(namespace, keys))
    }
}

// Implement Debug manually since Arc<dyn SecretStore> doesn't implement Debug
impl std::fmt::Debug for ChainSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSecretStore")
            .field(
                "stores",
                &self.stores.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
