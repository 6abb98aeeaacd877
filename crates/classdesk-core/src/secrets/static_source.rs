//! Credential pair loaded from pre-provisioned secrets

use std::sync::Arc;

use super::traits::{SecretStore, API_ENDPOINT, API_KEY};
use crate::logging::Logger;
use crate::{log_debug, log_warn};
use crate::types::CredentialPair;

/// Default namespace holding `API_KEY` / `API_ENDPOINT`
pub const DEFAULT_NAMESPACE: &str = "llm";

/// Loads the credential pair from a namespaced [`SecretStore`]
///
/// No network, no retries, no errors: absence is `None`. A namespace that
/// exists without both keys is a misconfiguration and gets a warning.
pub struct StaticCredentials {
    store: Arc<dyn SecretStore>,
    namespace: String,
    logger: Arc<dyn Logger>,
}

impl StaticCredentials {
    pub fn new(store: Arc<dyn SecretStore>, namespace: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            logger,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn lookup(&self, key: &str) -> Option<String> {
        self.store
            .get(&self.namespace, key)
            .filter(|value| !value.trim().is_empty())
    }

    /// Read the pair, logging absence and misconfiguration
    pub fn load(&self) -> Option<CredentialPair> {
        self.read(true)
    }

    /// Read the pair without logging anything
    pub fn peek(&self) -> Option<CredentialPair> {
        self.read(false)
    }

    fn read(&self, report: bool) -> Option<CredentialPair> {
        if !self.store.is_available() || !self.store.has_namespace(&self.namespace) {
            if report {
                log_debug!(self.logger,
                    "[StaticCredentials] No '{}' namespace in {} store",
                    self.namespace,
                    self.store.name()
                );
            }
            return None;
        }

        let api_key = self.lookup(API_KEY);
        let api_endpoint = self.lookup(API_ENDPOINT);
        if let (Some(api_key), Some(api_endpoint)) = (&api_key, &api_endpoint) {
            if report {
                log_debug!(self.logger,
                    "[StaticCredentials] Loaded credentials from '{}' in {} store",
                    self.namespace,
                    self.store.name()
                );
            }
            return Some(CredentialPair::new(api_key.clone(), api_endpoint.clone()));
        }

        if report {
            let mut missing = Vec::new();
            if api_key.is_none() {
                missing.push(API_KEY);
            }
            if api_endpoint.is_none() {
                missing.push(API_ENDPOINT);
            }
            log_warn!(self.logger,
                "[StaticCredentials] Namespace '{}' in {} store is missing {}",
                self.namespace,
                self.store.name(),
                missing.join(", ")
            );
        }

        // A later store in a chain may still hold the whole namespace
        let values = self.store.get_all(&self.namespace, &[API_KEY, API_ENDPOINT])?;
        let [api_key, api_endpoint]: [String; 2] = values.try_into().ok()?;
        if report {
            log_debug!(self.logger,
                "[StaticCredentials] Loaded complete '{}' namespace from a later store",
                self.namespace
            );
        }
        Some(CredentialPair::new(api_key, api_endpoint))
    }
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("store", &self.store.name())
            .field("namespace", &self.namespace)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemoryLogger};
    use crate::secrets::{ChainSecretStore, MemorySecretStore};

    fn source(store: MemorySecretStore) -> (StaticCredentials, Arc<MemoryLogger>) {
        let logger = Arc::new(MemoryLogger::new());
        (
            StaticCredentials::new(Arc::new(store), DEFAULT_NAMESPACE, logger.clone()),
            logger,
        )
    }

    #[test]
    fn test_load_complete_namespace() {
        let (static_creds, logger) = source(MemorySecretStore::with_credentials("llm", "k1", "https://e"));
        assert_eq!(static_creds.load(), Some(CredentialPair::new("k1", "https://e")));
        assert!(logger.at(LogLevel::Warn).is_empty());
        assert!(!logger.contains("k1"));
    }

    #[test]
    fn test_absent_namespace_is_silent() {
        let (static_creds, logger) = source(MemorySecretStore::new());
        assert_eq!(static_creds.load(), None);
        assert!(logger.at(LogLevel::Warn).is_empty());
    }

    #[test]
    fn test_partial_namespace_warns() {
        let store = MemorySecretStore::new();
        store.insert("llm", API_KEY, "k1");
        let (static_creds, logger) = source(store);

        assert_eq!(static_creds.load(), None);
        let warnings = logger.at(LogLevel::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(API_ENDPOINT));
        assert!(!warnings[0].contains("k1"));
    }

    #[test]
    fn test_empty_values_count_as_missing() {
        let store = MemorySecretStore::with_credentials("llm", "", "");
        let (static_creds, logger) = source(store);
        assert_eq!(static_creds.load(), None);
        assert_eq!(logger.at(LogLevel::Warn).len(), 1);
    }

    #[test]
    fn test_partial_store_does_not_hide_complete_bundle() {
        let stray = Arc::new(MemorySecretStore::new());
        stray.insert("llm", API_ENDPOINT, "https://stray");
        let bundle = Arc::new(MemorySecretStore::with_credentials("llm", "k2", "https://bundle"));
        let stores: Vec<Arc<dyn SecretStore>> = vec![stray, bundle];
        let logger = Arc::new(MemoryLogger::new());
        let static_creds =
            StaticCredentials::new(Arc::new(ChainSecretStore::new(stores)), DEFAULT_NAMESPACE, logger.clone());

        assert_eq!(static_creds.load(), Some(CredentialPair::new("k2", "https://bundle")));
        let warnings = logger.at(LogLevel::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(API_KEY));
        assert!(!logger.contains("k2"));
    }

    #[test]
    fn test_peek_is_silent() {
        let store = MemorySecretStore::new();
        store.insert("llm", API_KEY, "k1");
        let (static_creds, logger) = source(store);

        assert_eq!(static_creds.peek(), None);
        assert!(logger.lines().is_empty());

        let (complete, _) = source(MemorySecretStore::with_credentials("llm", "k1", "https://e"));
        assert_eq!(complete.peek(), Some(CredentialPair::new("k1", "https://e")));
    }
}
