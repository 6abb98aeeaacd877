//! Per-session credential state
//!
//! A `SessionState` lives exactly as long as one interactive session. It is
//! created empty, written by the resolver, and wiped by the gate's reset.
//! Nothing here is persisted, and no two sessions ever share one.

use zeroize::Zeroizing;

use crate::types::{CredentialPair, CredentialSource};

/// A resolved pair together with the source that first supplied it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedCredentials {
    pub pair: CredentialPair,
    pub origin: CredentialSource,
}

/// Mutable session record
#[derive(Default)]
pub struct SessionState {
    cached: Option<CachedCredentials>,
    configured: bool,
    decryption_key: Option<Zeroizing<String>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self) -> Option<&CachedCredentials> {
        self.cached.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Decryption key typed in by the user for this session, if any
    pub fn decryption_key(&self) -> Option<&str> {
        self.decryption_key.as_ref().map(|k| k.as_str())
    }

    pub fn set_decryption_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.decryption_key = if key.trim().is_empty() {
            None
        } else {
            Some(Zeroizing::new(key))
        };
    }

    pub(crate) fn cache(&mut self, pair: CredentialPair, origin: CredentialSource) {
        debug_assert!(origin != CredentialSource::SessionCached);
        self.cached = Some(CachedCredentials { pair, origin });
    }

    pub(crate) fn mark_configured(&mut self) {
        self.configured = true;
    }

    /// Forget everything: pair, origin, unlock key and the configured flag
    pub fn clear(&mut self) {
        self.cached = None;
        self.configured = false;
        self.decryption_key = None;
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState")
            .field("cached", &self.cached)
            .field("configured", &self.configured)
            .field("decryption_key", &self.decryption_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
