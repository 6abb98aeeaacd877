//! Authenticated encryption for configuration blobs
//!
//! Blob layout: `nonce (12 bytes) || ChaCha20-Poly1305 ciphertext + tag`.
//! Keys travel as base64 text of exactly 32 bytes.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroizing;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 12;
/// Poly1305 tag length
const TAG_LEN: usize = 16;

/// Cryptographic errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Decryption key is not valid base64")]
    KeyEncoding,

    #[error("Decryption key must be 32 bytes, got {0}")]
    KeyLength(usize),

    #[error("Ciphertext is too short")]
    Truncated,

    #[error("Decryption failed - invalid ciphertext or wrong key")]
    DecryptionFailed,

    #[error("Encryption failed")]
    EncryptionFailed,
}

pub type CryptoResult<T> = Result<T, CryptoError>;

/// A parsed 32-byte symmetric key, wiped on drop
pub struct ConfigKey(Zeroizing<[u8; KEY_LEN]>);

impl ConfigKey {
    /// Parse a key from base64 (standard or URL-safe, padding optional)
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let encoded = encoded.trim();
        let bytes = Zeroizing::new(
            [&STANDARD, &URL_SAFE, &STANDARD_NO_PAD, &URL_SAFE_NO_PAD]
                .iter()
                .find_map(|engine| engine.decode(encoded).ok())
                .ok_or(CryptoError::KeyEncoding)?,
        );
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::KeyLength(bytes.len()));
        }
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(&bytes);
        Ok(Self(key))
    }

    /// Generate a fresh random key
    pub fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(&mut *key);
        Self(key)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0.as_slice())
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(self.0.as_slice()))
    }
}

impl std::fmt::Debug for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConfigKey(<redacted>)")
    }
}

/// Encrypt `plaintext` into a blob with a random nonce
pub fn seal(key: &ConfigKey, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = key
        .cipher()
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Decrypt and authenticate a blob produced by [`seal`]
pub fn open(key: &ConfigKey, blob: &[u8]) -> CryptoResult<Zeroizing<Vec<u8>>> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::Truncated);
    }
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    key.cipher()
        .decrypt(nonce, ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open() {
        let key = ConfigKey::generate();
        let blob = seal(&key, b"{\"api_key\":\"k1\"}").unwrap();
        assert_eq!(blob.len(), NONCE_LEN + 16 + TAG_LEN);
        assert_eq!(open(&key, &blob).unwrap().as_slice(), b"{\"api_key\":\"k1\"}");
    }

    #[test]
    fn test_nonce_is_fresh() {
        let key = ConfigKey::generate();
        assert_ne!(seal(&key, b"same").unwrap(), seal(&key, b"same").unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let blob = seal(&ConfigKey::generate(), b"payload").unwrap();
        assert_eq!(
            open(&ConfigKey::generate(), &blob).unwrap_err(),
            CryptoError::DecryptionFailed
        );
    }

    #[test]
    fn test_tampered_blob_fails() {
        let key = ConfigKey::generate();
        let mut blob = seal(&key, b"payload").unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        assert_eq!(open(&key, &blob).unwrap_err(), CryptoError::DecryptionFailed);
    }

    #[test]
    fn test_truncated_blob() {
        let key = ConfigKey::generate();
        assert_eq!(open(&key, &[0u8; 10]).unwrap_err(), CryptoError::Truncated);
    }

    #[test]
    fn test_key_parsing() {
        let key = ConfigKey::generate();
        let encoded = key.to_base64();
        assert!(ConfigKey::from_base64(&encoded).is_ok());
        assert!(ConfigKey::from_base64(&format!("  {}\n", encoded)).is_ok());
        assert!(ConfigKey::from_base64(encoded.trim_end_matches('=')).is_ok());

        let url_safe = URL_SAFE.encode([0xffu8; KEY_LEN]);
        assert!(ConfigKey::from_base64(&url_safe).is_ok());

        assert_eq!(ConfigKey::from_base64("not base64!!").unwrap_err(), CryptoError::KeyEncoding);
        assert_eq!(
            ConfigKey::from_base64(&STANDARD.encode([1u8; 16])).unwrap_err(),
            CryptoError::KeyLength(16)
        );
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let key = ConfigKey::generate();
        assert_eq!(format!("{:?}", key), "ConfigKey(<redacted>)");
    }
}
