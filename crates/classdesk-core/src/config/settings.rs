//! Application settings (YAML)
//!
//! Read from `~/.config/classdesk/config.yaml` by default. Every section is
//! optional; a missing default file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::GenerationOptions;
use crate::resolver::{RemoteSource, DEFAULT_DECRYPTION_KEY_ENV};
use crate::secrets::DEFAULT_NAMESPACE;
use crate::tools::builtin::DEFAULT_TOOLS;

pub const ENV_CONFIG_URL: &str = "CLASSDESK_CONFIG_URL";
pub const ENV_SECRETS_FILE: &str = "CLASSDESK_SECRETS_FILE";
pub const ENV_SECRETS_NAMESPACE: &str = "CLASSDESK_SECRETS_NAMESPACE";

const APP_DIR: &str = "classdesk";

/// Settings errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Where static secrets come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretsSettings {
    /// YAML secret bundle; `<config dir>/classdesk/secrets.yaml` when unset
    pub bundle_path: Option<PathBuf>,
    pub namespace: String,
}

impl Default for SecretsSettings {
    fn default() -> Self {
        Self {
            bundle_path: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// Remote encrypted configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Blob URL; the remote source is disabled when unset
    pub config_url: Option<String>,
    /// Environment variable holding the decryption key
    pub decryption_key_env: String,
    pub timeout_secs: u64,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            config_url: None,
            decryption_key_env: DEFAULT_DECRYPTION_KEY_ENV.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Top-level settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub secrets: SecretsSettings,
    pub remote: RemoteSettings,
    pub generation: GenerationOptions,
    /// Built-in tools to offer, in display order
    pub tools: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            secrets: SecretsSettings::default(),
            remote: RemoteSettings::default(),
            generation: GenerationOptions::default(),
            tools: DEFAULT_TOOLS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl Settings {
    /// `~/.config/classdesk`, or the platform equivalent
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"))
            .join(APP_DIR)
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Load settings, apply environment overrides, and validate
    ///
    /// An explicit `path` must exist; the default path may be missing.
    pub fn load(path: Option<&Path>) -> SettingsResult<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        settings.apply_overrides(|name| std::env::var(name).ok());
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> SettingsResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse YAML; an empty document yields defaults
    pub fn from_yaml_str(content: &str) -> SettingsResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `CLASSDESK_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(ENV_CONFIG_URL) {
            self.remote.config_url = Some(url);
        }
        if let Some(path) = get(ENV_SECRETS_FILE) {
            self.secrets.bundle_path = Some(PathBuf::from(path));
        }
        if let Some(namespace) = get(ENV_SECRETS_NAMESPACE) {
            self.secrets.namespace = namespace;
        }
    }

    pub fn validate(&self) -> SettingsResult<()> {
        if self.secrets.namespace.trim().is_empty() {
            return Err(SettingsError::Invalid("secrets.namespace must not be empty".to_string()));
        }
        if self.remote.timeout_secs == 0 {
            return Err(SettingsError::Invalid("remote.timeout_secs must be greater than 0".to_string()));
        }
        if self.remote.decryption_key_env.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "remote.decryption_key_env must not be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(SettingsError::Invalid(format!(
                "generation.temperature must be between 0.0 and 2.0, got {}",
                self.generation.temperature
            )));
        }
        if self.generation.max_tokens == 0 {
            return Err(SettingsError::Invalid("generation.max_tokens must be greater than 0".to_string()));
        }
        if self.generation.response_field.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "generation.response_field must not be empty".to_string(),
            ));
        }
        if self.tools.is_empty() {
            return Err(SettingsError::Invalid("tools must list at least one tool".to_string()));
        }
        Ok(())
    }

    pub fn bundle_path(&self) -> PathBuf {
        self.secrets
            .bundle_path
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("secrets.yaml"))
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.timeout_secs)
    }

    /// Remote source for the resolver, if a URL is configured
    pub fn remote_source(&self) -> Option<RemoteSource> {
        let url = self.remote.config_url.as_deref()?.trim();
        if url.is_empty() {
            return None;
        }
        Some(
            RemoteSource::new(url)
                .with_decryption_key_env(self.remote.decryption_key_env.clone())
                .with_timeout(self.remote_timeout()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.secrets.namespace, "llm");
        assert_eq!(settings.remote.decryption_key_env, "CLASSDESK_CONFIG_KEY");
        assert_eq!(settings.remote_timeout(), Duration::from_secs(10));
        assert_eq!(settings.tools, DEFAULT_TOOLS);
        assert!(settings.remote_source().is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = Settings::from_yaml_str(
            r#"
remote:
  config_url: https://example.com/classdesk.bin
generation:
  temperature: 0.2
tools:
  - emoji_encoder
  - lyricist
"#,
        )
        .unwrap();

        assert_eq!(settings.remote.timeout_secs, 10);
        assert_eq!(settings.generation.temperature, 0.2);
        assert_eq!(settings.generation.max_tokens, 512);
        assert_eq!(settings.tools, vec!["emoji_encoder", "lyricist"]);

        let remote = settings.remote_source().unwrap();
        assert_eq!(remote.config_url, "https://example.com/classdesk.bin");
        assert_eq!(remote.decryption_key_env, "CLASSDESK_CONFIG_KEY");
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Settings::from_yaml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_unparsable_yaml() {
        assert!(matches!(
            Settings::from_yaml_str("remote: [unclosed"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();
        settings.remote.timeout_secs = 0;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        let mut settings = Settings::default();
        settings.generation.temperature = 2.5;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.generation.max_tokens = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.tools.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_CONFIG_URL, "https://override/blob"),
            (ENV_SECRETS_FILE, "/tmp/bundle.yaml"),
            (ENV_SECRETS_NAMESPACE, "   "),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(settings.remote.config_url.as_deref(), Some("https://override/blob"));
        assert_eq!(settings.bundle_path(), PathBuf::from("/tmp/bundle.yaml"));
        // Blank values are ignored
        assert_eq!(settings.secrets.namespace, "llm");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "secrets:\n  namespace: classroom\nremote:\n  timeout_secs: 3").unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.secrets.namespace, "classroom");
        assert_eq!(settings.remote_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(Settings::load(Some(&missing)), Err(SettingsError::Io { .. })));
    }
}
