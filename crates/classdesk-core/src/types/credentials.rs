//! Credential pair, its validated form, and where it came from

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The (API key, endpoint) tuple needed to reach the remote model
///
/// A pair is *valid* only when both fields are non-empty. Only a
/// [`ValidCredentials`] can be handed to a tool handler or a model client.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct CredentialPair {
    pub api_key: String,
    pub api_endpoint: String,
}

impl CredentialPair {
    pub fn new(api_key: impl Into<String>, api_endpoint: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_endpoint: api_endpoint.into(),
        }
    }

    /// An empty, invalid pair
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.field_errors().is_empty()
    }

    /// Field-level problems that keep this pair from being valid
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.api_key.trim().is_empty() {
            errors.push(FieldError::new(CredentialField::ApiKey, "API key is required"));
        }
        if self.api_endpoint.trim().is_empty() {
            errors.push(FieldError::new(
                CredentialField::ApiEndpoint,
                "API endpoint is required",
            ));
        }
        errors
    }

    /// Promote to [`ValidCredentials`], or report every missing field
    pub fn validate(&self) -> Result<ValidCredentials, Vec<FieldError>> {
        let errors = self.field_errors();
        if errors.is_empty() {
            Ok(ValidCredentials(self.clone()))
        } else {
            Err(errors)
        }
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "<redacted>" })
            .field("api_endpoint", &self.api_endpoint)
            .finish()
    }
}

/// A credential pair known to have both fields set
#[derive(Clone, PartialEq, Eq)]
pub struct ValidCredentials(CredentialPair);

impl ValidCredentials {
    pub fn api_key(&self) -> &str {
        &self.0.api_key
    }

    pub fn api_endpoint(&self) -> &str {
        &self.0.api_endpoint
    }

}

impl Deref for ValidCredentials {
    type Target = CredentialPair;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Debug for ValidCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValidCredentials").field(&self.0).finish()
    }
}

/// Which credential field a problem refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialField {
    ApiKey,
    ApiEndpoint,
}

impl CredentialField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialField::ApiKey => "api_key",
            CredentialField::ApiEndpoint => "api_endpoint",
        }
    }
}

impl fmt::Display for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field-level validation error reported back to the entry form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: CredentialField,
    pub message: String,
}

impl FieldError {
    pub fn new(field: CredentialField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Where a credential pair was resolved from
///
/// Only used for precedence and display policy; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// Pre-provisioned secret bundle or environment
    Static,
    /// Fetched and decrypted from a remote blob
    RemoteEncrypted,
    /// Previously resolved and held in the session
    SessionCached,
    /// Typed in by the user
    Manual,
}

impl CredentialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Static => "static",
            CredentialSource::RemoteEncrypted => "remote_encrypted",
            CredentialSource::SessionCached => "session_cached",
            CredentialSource::Manual => "manual",
        }
    }

    /// Static and remote credentials are authoritative and must not be edited
    pub fn is_authoritative(&self) -> bool {
        matches!(self, CredentialSource::Static | CredentialSource::RemoteEncrypted)
    }

    pub fn description(&self) -> &'static str {
        match self {
            CredentialSource::Static => "Pre-provisioned secrets",
            CredentialSource::RemoteEncrypted => "Encrypted remote configuration",
            CredentialSource::SessionCached => "Session cache",
            CredentialSource::Manual => "Manual entry",
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
