//! Fetching and decrypting the remote configuration blob

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::crypto::{self, ConfigKey};
use super::error::{ConfigError, ConfigResult};
use crate::logging::Logger;
use crate::types::CredentialPair;

/// Recommended bound for the remote fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of credentials stored as an encrypted blob behind a URL
#[async_trait]
pub trait ConfigFetcher: Send + Sync {
    /// Fetch `url` once, decrypt it with `decryption_key`, and read the pair
    ///
    /// Never retries; a timeout is reported as `FetchFailed`.
    async fn fetch_and_decrypt(
        &self,
        url: &str,
        decryption_key: &str,
        timeout: Duration,
    ) -> ConfigResult<CredentialPair>;
}

/// HTTP implementation of [`ConfigFetcher`]
///
/// Only the URL and the outcome are ever logged, never key material or
/// the decrypted payload.
pub struct SecureConfigFetcher {
    client: reqwest::Client,
    logger: Arc<dyn Logger>,
}

impl SecureConfigFetcher {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_client(reqwest::Client::new(), logger)
    }

    pub fn with_client(client: reqwest::Client, logger: Arc<dyn Logger>) -> Self {
        Self { client, logger }
    }

    async fn download(&self, url: &str, timeout: Duration) -> ConfigResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ConfigError::fetch_failed(url, describe_transport_error(&e, timeout)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConfigError::fetch_failed(url, format!("HTTP {}", status.as_u16())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ConfigError::fetch_failed(url, describe_transport_error(&e, timeout)))?;
        Ok(body.to_vec())
    }

    fn decode(key: &ConfigKey, blob: &[u8]) -> ConfigResult<CredentialPair> {
        let plaintext = crypto::open(key, blob).map_err(|e| ConfigError::DecryptFailed(e.to_string()))?;
        parse_payload(&plaintext)
    }
}

#[async_trait]
impl ConfigFetcher for SecureConfigFetcher {
    async fn fetch_and_decrypt(
        &self,
        url: &str,
        decryption_key: &str,
        timeout: Duration,
    ) -> ConfigResult<CredentialPair> {
        // A bad key can never succeed, so don't spend a request on it
        let key = ConfigKey::from_base64(decryption_key).map_err(|e| {
            self.logger.warn(&format!(
                "[SecureConfigFetcher] Unusable decryption key for {}",
                url
            ));
            ConfigError::DecryptFailed(e.to_string())
        })?;

        self.logger.info(&format!("[SecureConfigFetcher] Fetching remote configuration from {}", url));

        let result = match self.download(url, timeout).await {
            Ok(blob) => Self::decode(&key, &blob),
            Err(e) => Err(e),
        };

        match &result {
            Ok(_) => self.logger.info(&format!(
                "[SecureConfigFetcher] Loaded remote configuration from {}",
                url
            )),
            Err(e) => self.logger.warn(&format!(
                "[SecureConfigFetcher] Remote configuration from {} failed: {}",
                url,
                e.kind()
            )),
        }
        result
    }
}

impl std::fmt::Debug for SecureConfigFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureConfigFetcher").finish_non_exhaustive()
    }
}

/// Read `api_key` / `api_endpoint` from decrypted JSON
///
/// A missing or empty field is a malformed payload, never a default.
pub fn parse_payload(plaintext: &[u8]) -> ConfigResult<CredentialPair> {
    let pair: CredentialPair = serde_json::from_slice(plaintext).map_err(|e| {
        if e.is_data() {
            ConfigError::MalformedPayload(e.to_string())
        } else {
            ConfigError::MalformedPayload("payload is not a JSON object".to_string())
        }
    })?;

    let missing: Vec<&str> = pair.field_errors().iter().map(|e| e.field.as_str()).collect();
    if !missing.is_empty() {
        return Err(ConfigError::MalformedPayload(format!(
            "empty field(s): {}",
            missing.join(", ")
        )));
    }
    Ok(pair)
}

fn describe_transport_error(e: &reqwest::Error, timeout: Duration) -> String {
    if e.is_timeout() {
        format!("timed out after {:?}", timeout)
    } else if e.is_connect() {
        "connection failed".to_string()
    } else if e.is_builder() {
        "invalid URL".to_string()
    } else {
        "request failed".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogger;
    use mockito::Server;

    fn sealed(key: &ConfigKey, json: &str) -> Vec<u8> {
        crypto::seal(key, json.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_payload() {
        let pair = parse_payload(br#"{"api_key":"k1","api_endpoint":"https://e"}"#).unwrap();
        assert_eq!(pair, CredentialPair::new("k1", "https://e"));

        assert!(matches!(
            parse_payload(br#"{"api_key":"k1"}"#),
            Err(ConfigError::MalformedPayload(_))
        ));
        assert!(matches!(
            parse_payload(br#"{"api_key":"","api_endpoint":"https://e"}"#),
            Err(ConfigError::MalformedPayload(_))
        ));
        assert!(matches!(parse_payload(b"not json"), Err(ConfigError::MalformedPayload(_))));
        assert!(matches!(parse_payload(b"[1, 2]"), Err(ConfigError::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn test_fetch_and_decrypt_round_trip() {
        let key = ConfigKey::generate();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/config.bin")
            .with_status(200)
            .with_body(sealed(&key, r#"{"api_key":"k1","api_endpoint":"https://e"}"#))
            .expect(1)
            .create_async()
            .await;

        let logger = Arc::new(MemoryLogger::new());
        let fetcher = SecureConfigFetcher::new(logger.clone());
        let url = format!("{}/config.bin", server.url());

        let pair = fetcher
            .fetch_and_decrypt(&url, &key.to_base64(), DEFAULT_FETCH_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(pair.api_key, "k1");
        assert_eq!(pair.api_endpoint, "https://e");
        mock.assert_async().await;

        // Only the URL and the outcome are logged
        assert!(logger.contains(&url));
        assert!(!logger.contains("k1"));
        assert!(!logger.contains(&key.to_base64()));
    }

    #[tokio::test]
    async fn test_wrong_key_is_decrypt_failed() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/config.bin")
            .with_status(200)
            .with_body(sealed(&ConfigKey::generate(), r#"{"api_key":"k1","api_endpoint":"https://e"}"#))
            .create_async()
            .await;

        let fetcher = SecureConfigFetcher::new(Arc::new(MemoryLogger::new()));
        let result = fetcher
            .fetch_and_decrypt(
                &format!("{}/config.bin", server.url()),
                &ConfigKey::generate().to_base64(),
                DEFAULT_FETCH_TIMEOUT,
            )
            .await;

        assert!(matches!(result, Err(ConfigError::DecryptFailed(_))));
    }

    #[tokio::test]
    async fn test_malformed_key_skips_network() {
        let mut server = Server::new_async().await;
        let mock = server.mock("GET", "/config.bin").expect(0).create_async().await;

        let fetcher = SecureConfigFetcher::new(Arc::new(MemoryLogger::new()));
        let result = fetcher
            .fetch_and_decrypt(&format!("{}/config.bin", server.url()), "short", DEFAULT_FETCH_TIMEOUT)
            .await;

        assert!(matches!(result, Err(ConfigError::DecryptFailed(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_is_fetch_failed() {
        let mut server = Server::new_async().await;
        server.mock("GET", "/config.bin").with_status(404).create_async().await;

        let fetcher = SecureConfigFetcher::new(Arc::new(MemoryLogger::new()));
        let result = fetcher
            .fetch_and_decrypt(
                &format!("{}/config.bin", server.url()),
                &ConfigKey::generate().to_base64(),
                DEFAULT_FETCH_TIMEOUT,
            )
            .await;

        match result {
            Err(ConfigError::FetchFailed { reason, .. }) => assert_eq!(reason, "HTTP 404"),
            other => panic!("expected FetchFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wrong_shape_is_malformed() {
        let key = ConfigKey::generate();
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/config.bin")
            .with_status(200)
            .with_body(sealed(&key, r#"{"api_key":"k1"}"#))
            .create_async()
            .await;

        let fetcher = SecureConfigFetcher::new(Arc::new(MemoryLogger::new()));
        let result = fetcher
            .fetch_and_decrypt(&format!("{}/config.bin", server.url()), &key.to_base64(), DEFAULT_FETCH_TIMEOUT)
            .await;

        assert!(matches!(result, Err(ConfigError::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn test_hung_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer
        let hold = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let fetcher = SecureConfigFetcher::new(Arc::new(MemoryLogger::new()));
        let result = fetcher
            .fetch_and_decrypt(
                &format!("http://{}/config.bin", addr),
                &ConfigKey::generate().to_base64(),
                Duration::from_millis(200),
            )
            .await;

        assert!(matches!(result, Err(ConfigError::FetchFailed { .. })));
        hold.abort();
    }
}
