//! Credential resolution across static secrets, remote config, session
//! cache, and manual entry
//!
//! Precedence, first match wins:
//! 1. Static secrets, re-read every cycle
//! 2. Remote encrypted config, fetched once per session
//! 3. Whatever the session already holds
//! 4. Manual entry

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use zeroize::Zeroizing;

use crate::logging::Logger;
use crate::log_warn;
use crate::remote::{ConfigError, ConfigFetcher, DEFAULT_FETCH_TIMEOUT};
use crate::secrets::StaticCredentials;
use crate::session::SessionState;
use crate::types::{CredentialPair, CredentialSource, DisplayPolicy, ValidCredentials};

/// Environment variable holding the remote config decryption key
pub const DEFAULT_DECRYPTION_KEY_ENV: &str = "CLASSDESK_CONFIG_KEY";

/// Result of one resolution cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Working pair; may be incomplete when `source` is `Manual`
    #[serde(skip)]
    pub pair: CredentialPair,
    /// Branch that produced this resolution
    pub source: CredentialSource,
    /// Source that originally supplied the pair
    pub origin: CredentialSource,
    pub display: DisplayPolicy,
    /// Remote config failure seen during this cycle, if any
    #[serde(skip)]
    pub error: Option<ConfigError>,
}

impl Resolution {
    fn new(pair: CredentialPair, source: CredentialSource, origin: CredentialSource) -> Self {
        let display = DisplayPolicy::for_source(origin, &pair);
        Self {
            pair,
            source,
            origin,
            display,
            error: None,
        }
    }

    fn with_error(mut self, error: Option<ConfigError>) -> Self {
        self.error = error;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.pair.is_valid()
    }

    pub fn valid(&self) -> Option<ValidCredentials> {
        self.pair.validate().ok()
    }

    /// Whether the fields came from a source the user may not edit
    pub fn is_authoritative(&self) -> bool {
        self.origin.is_authoritative() && self.is_valid()
    }
}

/// Remote encrypted configuration settings
#[derive(Debug, Clone)]
pub struct RemoteSource {
    pub config_url: String,
    pub decryption_key_env: String,
    pub timeout: Duration,
}

impl RemoteSource {
    pub fn new(config_url: impl Into<String>) -> Self {
        Self {
            config_url: config_url.into(),
            decryption_key_env: DEFAULT_DECRYPTION_KEY_ENV.to_string(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_decryption_key_env(mut self, name: impl Into<String>) -> Self {
        self.decryption_key_env = name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Picks the working credential pair for a session
///
/// Holds no per-session data, so one resolver can serve every session.
pub struct CredentialResolver {
    static_credentials: StaticCredentials,
    fetcher: Arc<dyn ConfigFetcher>,
    remote: Option<RemoteSource>,
    logger: Arc<dyn Logger>,
}

impl CredentialResolver {
    pub fn new(
        static_credentials: StaticCredentials,
        fetcher: Arc<dyn ConfigFetcher>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            static_credentials,
            fetcher,
            remote: None,
            logger,
        }
    }

    pub fn with_remote(mut self, remote: RemoteSource) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn remote(&self) -> Option<&RemoteSource> {
        self.remote.as_ref()
    }

    /// Run one resolution cycle
    ///
    /// Remote failures never abort the cycle; they are reported in
    /// [`Resolution::error`] and resolution falls through to manual entry.
    pub async fn resolve(&self, state: &mut SessionState, manual_override: Option<CredentialPair>) -> Resolution {
        if let Some(pair) = self.static_credentials.load().filter(CredentialPair::is_valid) {
            self.logger.debug("[CredentialResolver] Using static credentials");
            state.cache(pair.clone(), CredentialSource::Static);
            return Resolution::new(pair, CredentialSource::Static, CredentialSource::Static);
        }

        let mut remote_error = None;
        if state.cached().is_none() {
            match self.try_remote(state).await {
                Some(Ok(pair)) => {
                    state.cache(pair.clone(), CredentialSource::RemoteEncrypted);
                    return Resolution::new(pair, CredentialSource::RemoteEncrypted, CredentialSource::RemoteEncrypted);
                }
                Some(Err(e)) => remote_error = Some(e),
                None => {}
            }
        }

        if let Some(cached) = state.cached() {
            let replaces_manual = cached.origin == CredentialSource::Manual
                && manual_override.as_ref().is_some_and(|pair| *pair != cached.pair);
            if !replaces_manual {
                let (pair, origin) = (cached.pair.clone(), cached.origin);
                return Resolution::new(pair, CredentialSource::SessionCached, origin).with_error(remote_error);
            }
        }

        let pair = manual_override.unwrap_or_default();
        if pair.is_valid() {
            self.logger.debug("[CredentialResolver] Caching manually entered credentials");
            state.cache(pair.clone(), CredentialSource::Manual);
        }
        Resolution::new(pair, CredentialSource::Manual, CredentialSource::Manual).with_error(remote_error)
    }

    /// Whether manual entry is currently locked by an authoritative source
    ///
    /// Never touches the network and never logs.
    pub fn is_locked(&self, state: &SessionState) -> bool {
        self.locked_by(state).is_some()
    }

    /// The authoritative source locking manual entry, if any
    pub fn locked_by(&self, state: &SessionState) -> Option<CredentialSource> {
        if self.static_credentials.peek().is_some_and(|pair| pair.is_valid()) {
            return Some(CredentialSource::Static);
        }
        state
            .cached()
            .map(|cached| cached.origin)
            .filter(|origin| origin.is_authoritative())
    }

    async fn try_remote(&self, state: &SessionState) -> Option<Result<CredentialPair, ConfigError>> {
        let remote = self.remote.as_ref()?;
        let key = match state.decryption_key() {
            Some(key) => Zeroizing::new(key.to_string()),
            None => {
                let key = std::env::var(&remote.decryption_key_env)
                    .ok()
                    .filter(|k| !k.trim().is_empty())?;
                Zeroizing::new(key)
            }
        };

        let result = self
            .fetcher
            .fetch_and_decrypt(&remote.config_url, key.trim(), remote.timeout)
            .await;
        if let Err(e) = &result {
            log_warn!(self.logger,
                "[CredentialResolver] Remote configuration unavailable ({}), falling back to manual entry",
                e.kind()
            );
        }
        Some(result)
    }
}

impl std::fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("namespace", &self.static_credentials.namespace())
            .field("remote", &self.remote)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{MemoryLogger, NoOpLogger};
    use crate::remote::crypto::{self, ConfigKey};
    use crate::remote::{ConfigResult, SecureConfigFetcher};
    use crate::secrets::{MemorySecretStore, DEFAULT_NAMESPACE};
    use async_trait::async_trait;
    use mockito::Server;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher returning a canned result and counting calls
    struct StubFetcher {
        result: ConfigResult<CredentialPair>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn ok(key: &str, endpoint: &str) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(CredentialPair::new(key, endpoint)),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(error: ConfigError) -> Arc<Self> {
            Arc::new(Self {
                result: Err(error),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ConfigFetcher for StubFetcher {
        async fn fetch_and_decrypt(&self, _url: &str, _key: &str, _timeout: Duration) -> ConfigResult<CredentialPair> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    fn static_from(store: MemorySecretStore) -> StaticCredentials {
        StaticCredentials::new(Arc::new(store), DEFAULT_NAMESPACE, Arc::new(NoOpLogger::new()))
    }

    fn empty_static() -> StaticCredentials {
        static_from(MemorySecretStore::new())
    }

    fn resolver(static_credentials: StaticCredentials, fetcher: Arc<dyn ConfigFetcher>) -> CredentialResolver {
        CredentialResolver::new(static_credentials, fetcher, Arc::new(NoOpLogger::new()))
            .with_remote(RemoteSource::new("https://config.invalid/blob").with_decryption_key_env("CLASSDESK_TEST_UNSET_KEY"))
    }

    fn unlocked_session() -> SessionState {
        let mut state = SessionState::new();
        state.set_decryption_key("session-key");
        state
    }

    #[tokio::test]
    async fn test_static_wins_over_remote() {
        let fetcher = StubFetcher::ok("remote-key", "https://remote");
        let store = MemorySecretStore::with_credentials(DEFAULT_NAMESPACE, "static-key", "https://static");
        let resolver = resolver(static_from(store), fetcher.clone());
        let mut state = unlocked_session();

        let resolution = resolver.resolve(&mut state, None).await;
        assert_eq!(resolution.source, CredentialSource::Static);
        assert_eq!(resolution.pair, CredentialPair::new("static-key", "https://static"));
        assert!(resolution.display.is_locked());
        assert_eq!(fetcher.calls(), 0);

        // Still static on the next cycle
        let again = resolver.resolve(&mut state, None).await;
        assert_eq!(again.source, CredentialSource::Static);
        assert_eq!(again.pair, resolution.pair);
    }

    #[tokio::test]
    async fn test_static_wins_over_manual_override() {
        let store = MemorySecretStore::with_credentials(DEFAULT_NAMESPACE, "static-key", "https://static");
        let resolver = resolver(static_from(store), StubFetcher::ok("r", "https://r"));
        let mut state = SessionState::new();

        let resolution = resolver
            .resolve(&mut state, Some(CredentialPair::new("typed", "https://typed")))
            .await;
        assert_eq!(resolution.source, CredentialSource::Static);
        assert_eq!(resolution.pair.api_key, "static-key");
    }

    #[tokio::test]
    async fn test_partial_static_falls_through() {
        let store = MemorySecretStore::new();
        store.insert(DEFAULT_NAMESPACE, "API_KEY", "only-key");
        let fetcher = StubFetcher::ok("remote-key", "https://remote");
        let resolver = resolver(static_from(store), fetcher.clone());
        let mut state = unlocked_session();

        let resolution = resolver.resolve(&mut state, None).await;
        assert_eq!(resolution.source, CredentialSource::RemoteEncrypted);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_remote_is_fetched_once_per_session() {
        let fetcher = StubFetcher::ok("k1", "https://e");
        let resolver = resolver(empty_static(), fetcher.clone());
        let mut state = unlocked_session();

        let first = resolver.resolve(&mut state, None).await;
        assert_eq!(first.source, CredentialSource::RemoteEncrypted);
        assert_eq!(first.origin, CredentialSource::RemoteEncrypted);
        assert!(first.display.is_locked());

        let second = resolver.resolve(&mut state, None).await;
        assert_eq!(second.source, CredentialSource::SessionCached);
        assert_eq!(second.origin, CredentialSource::RemoteEncrypted);
        assert_eq!(second.pair, first.pair);
        assert_eq!(second.display, first.display);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_key_skips_remote() {
        let fetcher = StubFetcher::ok("k1", "https://e");
        let resolver = resolver(empty_static(), fetcher.clone());
        let mut state = SessionState::new();

        let resolution = resolver.resolve(&mut state, None).await;
        assert_eq!(resolution.source, CredentialSource::Manual);
        assert!(!resolution.is_valid());
        assert!(resolution.error.is_none());
        assert_eq!(resolution.display, DisplayPolicy::blank());
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_remote_configured_skips_fetch() {
        let fetcher = StubFetcher::ok("k1", "https://e");
        let resolver = CredentialResolver::new(empty_static(), fetcher.clone(), Arc::new(NoOpLogger::new()));
        let mut state = unlocked_session();

        let resolution = resolver.resolve(&mut state, None).await;
        assert_eq!(resolution.source, CredentialSource::Manual);
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_env_decryption_key_is_used() {
        std::env::set_var("CLASSDESK_TEST_RESOLVER_ENV_KEY", "env-key");
        let fetcher = StubFetcher::ok("k1", "https://e");
        let resolver = CredentialResolver::new(empty_static(), fetcher.clone(), Arc::new(NoOpLogger::new()))
            .with_remote(RemoteSource::new("https://config.invalid").with_decryption_key_env("CLASSDESK_TEST_RESOLVER_ENV_KEY"));
        let mut state = SessionState::new();

        let resolution = resolver.resolve(&mut state, None).await;
        std::env::remove_var("CLASSDESK_TEST_RESOLVER_ENV_KEY");

        assert_eq!(resolution.source, CredentialSource::RemoteEncrypted);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_decrypt_failure_falls_through_to_manual() {
        let fetcher = StubFetcher::failing(ConfigError::DecryptFailed("tag mismatch".to_string()));
        let resolver = resolver(empty_static(), fetcher.clone());
        let mut state = unlocked_session();

        let resolution = resolver.resolve(&mut state, None).await;
        assert_eq!(resolution.source, CredentialSource::Manual);
        assert!(!resolution.is_valid());
        assert!(matches!(resolution.error, Some(ConfigError::DecryptFailed(_))));
        assert!(resolution.display.api_key.editable);
        assert!(state.cached().is_none());
    }

    #[tokio::test]
    async fn test_remote_retried_until_cached() {
        let fetcher = StubFetcher::failing(ConfigError::fetch_failed("https://config.invalid/blob", "HTTP 503"));
        let resolver = resolver(empty_static(), fetcher.clone());
        let mut state = unlocked_session();

        resolver.resolve(&mut state, None).await;
        resolver.resolve(&mut state, None).await;
        assert_eq!(fetcher.calls(), 2);

        // Once a manual pair is cached the remote is no longer consulted
        resolver
            .resolve(&mut state, Some(CredentialPair::new("typed", "https://typed")))
            .await;
        let resolution = resolver.resolve(&mut state, None).await;
        assert_eq!(resolution.source, CredentialSource::SessionCached);
        assert_eq!(resolution.origin, CredentialSource::Manual);
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn test_manual_override() {
        let resolver = resolver(empty_static(), StubFetcher::ok("k", "https://e"));
        let mut state = SessionState::new();

        let partial = resolver
            .resolve(&mut state, Some(CredentialPair::new("typed", "")))
            .await;
        assert_eq!(partial.source, CredentialSource::Manual);
        assert!(!partial.is_valid());
        assert_eq!(partial.pair.api_key, "typed");
        assert!(state.cached().is_none());

        let full = resolver
            .resolve(&mut state, Some(CredentialPair::new("typed", "https://typed")))
            .await;
        assert_eq!(full.source, CredentialSource::Manual);
        assert!(full.is_valid());
        assert!(full.display.api_key.masked);
        assert!(full.display.api_endpoint.editable);
        assert!(!full.display.api_endpoint.masked);

        let cached = resolver.resolve(&mut state, None).await;
        assert_eq!(cached.source, CredentialSource::SessionCached);
        assert_eq!(cached.origin, CredentialSource::Manual);
        assert_eq!(cached.pair, full.pair);
        assert!(cached.display.api_key.editable);
    }

    #[tokio::test]
    async fn test_new_manual_override_replaces_manual_cache() {
        let resolver = resolver(empty_static(), StubFetcher::ok("k", "https://e"));
        let mut state = SessionState::new();

        resolver.resolve(&mut state, Some(CredentialPair::new("first", "https://one"))).await;
        let replaced = resolver
            .resolve(&mut state, Some(CredentialPair::new("second", "https://two")))
            .await;
        assert_eq!(replaced.source, CredentialSource::Manual);
        assert_eq!(state.cached().unwrap().pair.api_key, "second");
    }

    #[test]
    fn test_locked_by_reports_origin_without_logging() {
        let store = MemorySecretStore::new();
        store.insert(DEFAULT_NAMESPACE, "API_KEY", "only-key");
        let logger = Arc::new(MemoryLogger::new());
        let partial = StaticCredentials::new(Arc::new(store), DEFAULT_NAMESPACE, logger.clone());
        let resolver = CredentialResolver::new(partial, StubFetcher::ok("k", "https://e"), logger.clone());

        assert_eq!(resolver.locked_by(&SessionState::new()), None);
        assert!(logger.lines().is_empty());

        let store = MemorySecretStore::with_credentials(DEFAULT_NAMESPACE, "static-key", "https://static");
        let locked = CredentialResolver::new(static_from(store), StubFetcher::ok("k", "https://e"), logger.clone());
        assert_eq!(locked.locked_by(&SessionState::new()), Some(CredentialSource::Static));
    }

    #[tokio::test]
    async fn test_manual_override_cannot_replace_remote() {
        let resolver = resolver(empty_static(), StubFetcher::ok("k1", "https://e"));
        let mut state = unlocked_session();
        assert!(!resolver.is_locked(&state));

        resolver.resolve(&mut state, None).await;
        assert!(resolver.is_locked(&state));
        assert_eq!(resolver.locked_by(&state), Some(CredentialSource::RemoteEncrypted));
        let resolution = resolver
            .resolve(&mut state, Some(CredentialPair::new("typed", "https://typed")))
            .await;
        assert_eq!(resolution.source, CredentialSource::SessionCached);
        assert_eq!(resolution.origin, CredentialSource::RemoteEncrypted);
        assert_eq!(resolution.pair.api_key, "k1");
    }

    #[tokio::test]
    async fn test_cleared_session_resolves_fresh() {
        let fetcher = StubFetcher::ok("k1", "https://e");
        let resolver = resolver(empty_static(), fetcher.clone());
        let mut state = unlocked_session();

        resolver.resolve(&mut state, None).await;
        state.clear();

        let resolution = resolver.resolve(&mut state, None).await;
        assert_ne!(resolution.source, CredentialSource::SessionCached);
        assert_eq!(resolution.source, CredentialSource::Manual);
        assert_eq!(resolution.display, DisplayPolicy::blank());
    }

    #[tokio::test]
    async fn test_end_to_end_remote_blob() {
        let key = ConfigKey::generate();
        let blob = crypto::seal(&key, br#"{"api_key":"k1","api_endpoint":"https://e"}"#).unwrap();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/classdesk.bin")
            .with_status(200)
            .with_body(blob)
            .expect(1)
            .create_async()
            .await;

        let env_name = "CLASSDESK_TEST_RESOLVER_E2E_KEY";
        std::env::set_var(env_name, key.to_base64());

        let logger = Arc::new(MemoryLogger::new());
        let fetcher = Arc::new(SecureConfigFetcher::new(logger.clone()));
        let resolver = CredentialResolver::new(empty_static(), fetcher, logger.clone()).with_remote(
            RemoteSource::new(format!("{}/classdesk.bin", server.url()))
                .with_decryption_key_env(env_name)
                .with_timeout(Duration::from_secs(5)),
        );
        let mut state = SessionState::new();

        let first = resolver.resolve(&mut state, None).await;
        let second = resolver.resolve(&mut state, None).await;
        std::env::remove_var(env_name);

        assert_eq!(first.pair, CredentialPair::new("k1", "https://e"));
        assert_eq!(first.source, CredentialSource::RemoteEncrypted);
        assert!(first.display.api_key.masked && !first.display.api_key.editable);
        assert!(first.display.api_endpoint.masked && !first.display.api_endpoint.editable);

        assert_eq!(second.pair, first.pair);
        assert_eq!(second.origin, CredentialSource::RemoteEncrypted);
        mock.assert_async().await;

        let key_b64 = key.to_base64();
        assert!(!logger.contains(&key_b64));
        assert!(!logger.contains("k1"));
    }
}
