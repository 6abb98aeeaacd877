//! Remote encrypted configuration
//!
//! An encrypted blob holding `{"api_key": ..., "api_endpoint": ...}` is
//! fetched from a URL and decrypted locally with a symmetric key.

mod error;
pub mod crypto;
mod fetcher;

pub use error::{ConfigError, ConfigResult};
pub use crypto::{ConfigKey, CryptoError};
pub use fetcher::{ConfigFetcher, SecureConfigFetcher, parse_payload, DEFAULT_FETCH_TIMEOUT};
