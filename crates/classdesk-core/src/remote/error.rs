//! Remote configuration error types

use thiserror::Error;

/// Why a remote encrypted configuration could not be resolved
///
/// Fetch and decrypt failures are kept apart so the user can tell a
/// connectivity problem from a wrong key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Network failure, timeout, or non-2xx response
    #[error("Failed to fetch remote configuration from {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    /// Wrong key, malformed key, or corrupted/tampered payload
    #[error("Failed to decrypt remote configuration: {0}")]
    DecryptFailed(String),

    /// Decryption worked but the payload has the wrong shape
    #[error("Remote configuration is malformed: {0}")]
    MalformedPayload(String),
}

impl ConfigError {
    pub fn fetch_failed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Short failure class, safe to log
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigError::FetchFailed { .. } => "fetch_failed",
            ConfigError::DecryptFailed(_) => "decrypt_failed",
            ConfigError::MalformedPayload(_) => "malformed_payload",
        }
    }

    /// Message for the "configuration attempted and failed" case
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::FetchFailed { .. } => {
                "Could not download the remote configuration. Check your connection and try again.".to_string()
            }
            ConfigError::DecryptFailed(_) => {
                "Could not decrypt the remote configuration. The decryption key is probably wrong.".to_string()
            }
            ConfigError::MalformedPayload(_) => {
                "The remote configuration was decrypted but does not contain an API key and endpoint.".to_string()
            }
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
