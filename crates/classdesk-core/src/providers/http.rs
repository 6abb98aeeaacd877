//! HTTP model client

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::error::{ProviderError, ProviderResult};
use super::traits::{GenerationOptions, ModelClient};
use crate::logging::Logger;
use crate::types::ValidCredentials;

/// Upper bound for one completion request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

/// Host part of an endpoint, for logging
///
/// Paths and query strings can carry deployment details, so only the host
/// is ever logged.
fn endpoint_host(endpoint: &str) -> String {
    reqwest::Url::parse(endpoint)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "<endpoint>".to_string())
}

/// Calls `POST <endpoint>` with a bearer token and a single prompt
pub struct HttpModelClient {
    client: reqwest::Client,
    timeout: Duration,
    logger: Arc<dyn Logger>,
}

impl HttpModelClient {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_client(reqwest::Client::new(), logger)
    }

    pub fn with_client(client: reqwest::Client, logger: Arc<dyn Logger>) -> Self {
        Self {
            client,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            logger,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn extract_text(&self, body: &Value, field: &str) -> ProviderResult<String> {
        match body.get(field) {
            Some(Value::String(text)) => Ok(text.clone()),
            Some(_) => Err(ProviderError::invalid_response(
                self.name(),
                format!("field '{}' is not a string", field),
            )),
            None => Err(ProviderError::invalid_response(
                self.name(),
                format!("missing field '{}'", field),
            )),
        }
    }
}

#[async_trait]
impl ModelClient for HttpModelClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn complete(
        &self,
        credentials: &ValidCredentials,
        prompt: &str,
        options: &GenerationOptions,
    ) -> ProviderResult<String> {
        self.logger.debug(&format!(
            "[HttpModelClient] POST to {} (prompt_len={}, max_tokens={})",
            endpoint_host(credentials.api_endpoint()),
            prompt.len(),
            options.max_tokens
        ));

        let request = CompletionRequest {
            prompt,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let response = self
            .client
            .post(credentials.api_endpoint())
            .bearer_auth(credentials.api_key())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                self.logger.error(&format!("[HttpModelClient] Request failed: {}", e));
                ProviderError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            self.logger.error(&format!("[HttpModelClient] HTTP {}", status.as_u16()));
            return Err(ProviderError::api_error(self.name(), status.as_u16(), message));
        }

        let body: Value = response.json().await?;
        self.extract_text(&body, &options.response_field)
    }
}

impl std::fmt::Debug for HttpModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpModelClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
