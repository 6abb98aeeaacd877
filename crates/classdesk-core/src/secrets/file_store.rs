//! Secret bundle stored as a YAML file
//!
//! ```yaml
//! llm:
//!   API_KEY: sk-...
//!   API_ENDPOINT: https://models.example.com/v1/generate
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_yaml::Value;

use super::traits::{SecretStore, SecretStoreResult};
use crate::logging::Logger;

/// Read-only secret store backed by a YAML bundle on disk
///
/// The file is read once when the store is opened. A missing file is a
/// normal, empty store; an unreadable or malformed one is logged at warning
/// level and also treated as empty.
pub struct FileSecretStore {
    path: PathBuf,
    bundle: HashMap<String, Value>,
}

impl FileSecretStore {
    /// Open a bundle, treating any failure as an empty store
    pub fn open(path: impl Into<PathBuf>, logger: Arc<dyn Logger>) -> Self {
        let path = path.into();
        match Self::load(&path) {
            Ok(bundle) => Self { path, bundle },
            Err(e) => {
                logger.warn(&format!(
                    "[FileSecretStore] Ignoring secret bundle {}: {}",
                    path.display(),
                    e
                ));
                Self {
                    path,
                    bundle: HashMap::new(),
                }
            }
        }
    }

    /// Parse a bundle from YAML text
    pub fn from_yaml_str(content: &str) -> SecretStoreResult<Self> {
        Ok(Self {
            path: PathBuf::new(),
            bundle: Self::parse(content)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> SecretStoreResult<HashMap<String, Value>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> SecretStoreResult<HashMap<String, Value>> {
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        let bundle: HashMap<String, Value> = serde_yaml::from_str(content)?;
        Ok(bundle)
    }

    fn scalar_to_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl SecretStore for FileSecretStore {
    fn name(&self) -> &str {
        "file"
    }

    fn is_available(&self) -> bool {
        !self.bundle.is_empty()
    }

    fn has_namespace(&self, namespace: &str) -> bool {
        matches!(self.bundle.get(namespace), Some(Value::Mapping(_)) | Some(Value::Null))
    }

    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        let Some(Value::Mapping(ns)) = self.bundle.get(namespace) else {
            return None;
        };
        ns.get(key)
            .and_then(Self::scalar_to_string)
            .filter(|v| !v.is_empty())
    }
}

// Implement Debug manually so bundle values never end up in logs
impl std::fmt::Debug for FileSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSecretStore")
            .field("path", &self.path)
            .field("namespaces", &self.bundle.keys().collect::<Vec<_>>())
            .finish()
    }
}
