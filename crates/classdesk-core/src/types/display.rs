//! Display policy for the two credential fields
//!
//! The presentation layer must honor whatever policy the resolver returns:
//! a field marked non-editable must never accept input.

use serde::Serialize;

use super::credentials::{CredentialPair, CredentialSource};

const MASK: &str = "••••••••";

/// Keys shorter than this are masked completely
const MIN_LEN_FOR_HINT: usize = 12;

/// How one field is presented
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDisplay {
    /// Text to show (already masked when `masked` is set)
    pub value: String,
    pub masked: bool,
    pub editable: bool,
}

/// How both credential fields are presented
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayPolicy {
    pub api_key: FieldDisplay,
    pub api_endpoint: FieldDisplay,
}

impl DisplayPolicy {
    /// Display policy as a pure function of where the pair came from
    ///
    /// Authoritative sources are masked and locked; manual entry is editable
    /// with only the key masked. `SessionCached` is not an origin and is
    /// treated like manual entry.
    pub fn for_source(origin: CredentialSource, pair: &CredentialPair) -> Self {
        if origin.is_authoritative() {
            Self {
                api_key: FieldDisplay {
                    value: mask_secret(&pair.api_key),
                    masked: true,
                    editable: false,
                },
                api_endpoint: FieldDisplay {
                    value: mask_secret(&pair.api_endpoint),
                    masked: true,
                    editable: false,
                },
            }
        } else {
            Self {
                api_key: FieldDisplay {
                    value: mask_secret(&pair.api_key),
                    masked: true,
                    editable: true,
                },
                api_endpoint: FieldDisplay {
                    value: pair.api_endpoint.clone(),
                    masked: false,
                    editable: true,
                },
            }
        }
    }

    /// Policy for a session with nothing entered yet
    pub fn blank() -> Self {
        Self::for_source(CredentialSource::Manual, &CredentialPair::empty())
    }

    pub fn is_locked(&self) -> bool {
        !self.api_key.editable && !self.api_endpoint.editable
    }
}

/// Mask a secret for display
///
/// Empty stays empty so a cleared session never shows a stale mask.
pub fn mask_secret(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < MIN_LEN_FOR_HINT {
        return MASK.to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", MASK, tail)
}
