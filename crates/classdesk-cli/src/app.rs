//! Wiring settings into a ready-to-use gate.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use classdesk_core::{
    ChainSecretStore, ConfigurationGate, CredentialResolver, EnvSecretStore, FileSecretStore, HttpModelClient,
    MockModelClient, ModelClient, SecretStore, SecureConfigFetcher, Settings, SharedLogger, StaticCredentials, ToolRegistry,
    TracingLogger,
};

pub struct App {
    pub gate: ConfigurationGate,
}

impl App {
    pub fn load(config: Option<&Path>, offline: bool) -> Result<Self> {
        let settings = Settings::load(config).context("Failed to load settings")?;
        Self::build(settings, offline)
    }

    pub fn build(settings: Settings, offline: bool) -> Result<Self> {
        let logger: SharedLogger = Arc::new(TracingLogger::new());

        // Environment variables take precedence over the bundle file
        let bundle = FileSecretStore::open(settings.bundle_path(), logger.clone());
        let stores: Vec<Arc<dyn SecretStore>> = vec![Arc::new(EnvSecretStore::new()), Arc::new(bundle)];
        let store = ChainSecretStore::new(stores);
        let static_credentials =
            StaticCredentials::new(Arc::new(store), settings.secrets.namespace.clone(), logger.clone());

        let fetcher = Arc::new(SecureConfigFetcher::new(logger.clone()));
        let mut resolver = CredentialResolver::new(static_credentials, fetcher, logger.clone());
        if let Some(remote) = settings.remote_source() {
            resolver = resolver.with_remote(remote);
        }

        let model: Arc<dyn ModelClient> = if offline {
            Arc::new(MockModelClient::echo(logger.clone()))
        } else {
            Arc::new(HttpModelClient::new(logger.clone()))
        };

        let registry = ToolRegistry::from_catalog(&settings.tools, model, settings.generation.clone(), logger.clone())
            .context("Invalid tool list in settings")?;

        let gate = ConfigurationGate::new(Arc::new(resolver), Arc::new(registry), logger);
        Ok(Self { gate })
    }
}
