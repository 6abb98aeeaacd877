//! Gate error types

use thiserror::Error;

use crate::tools::RegistryError;
use crate::types::{CredentialSource, FieldError};

/// Why the gate refused a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// No valid credential pair yet
    #[error("Credentials are not configured")]
    NotConfigured,

    /// The fields come from an authoritative source and cannot be edited
    #[error("Credentials are locked ({})", .0.description())]
    Locked(CredentialSource),

    /// Manual entry is incomplete
    #[error("Invalid credentials: {}", join_fields(.0))]
    InvalidFields(Vec<FieldError>),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl GateError {
    pub fn user_message(&self) -> String {
        match self {
            GateError::NotConfigured => {
                "Not configured yet. Enter an API key and endpoint, or unlock the remote configuration.".to_string()
            }
            // Reset cannot undo pre-provisioned secrets; they are read again on every refresh
            GateError::Locked(CredentialSource::Static) => {
                "These credentials were provided for you and cannot be changed here. Ask whoever set up ClassDesk to update them."
                    .to_string()
            }
            GateError::Locked(_) => {
                "These credentials come from the remote configuration and cannot be changed here. Use reset to start over."
                    .to_string()
            }
            GateError::InvalidFields(errors) => errors
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<_>>()
                .join("; "),
            GateError::Registry(e) => e.to_string(),
        }
    }

    /// Field errors of an `InvalidFields` rejection
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            GateError::InvalidFields(errors) => errors,
            _ => &[],
        }
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
