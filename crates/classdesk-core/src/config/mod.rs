//! Configuration module
//!
//! Application settings loaded from YAML with `CLASSDESK_*` environment
//! overrides.

mod settings;

pub use settings::{
    RemoteSettings, SecretsSettings, Settings, SettingsError, SettingsResult, ENV_CONFIG_URL, ENV_SECRETS_FILE,
    ENV_SECRETS_NAMESPACE,
};
