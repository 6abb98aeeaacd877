//! Two-state gate in front of the tool registry

use std::sync::Arc;

use serde::Serialize;

use super::error::GateError;
use crate::logging::Logger;
use crate::{log_debug, log_info};
use crate::resolver::{CredentialResolver, Resolution};
use crate::session::SessionState;
use crate::tools::{ToolInfo, ToolInput, ToolOutcome, ToolRegistry};
use crate::types::{CredentialPair, CredentialSource};

/// Gate state for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateStatus {
    Unconfigured,
    Configured { origin: CredentialSource },
}

impl GateStatus {
    pub fn is_configured(&self) -> bool {
        matches!(self, GateStatus::Configured { .. })
    }
}

/// Sole entry point into tool dispatch
///
/// The gate holds no session data of its own. Every operation takes the
/// caller's [`SessionState`], so one gate serves any number of sessions.
pub struct ConfigurationGate {
    resolver: Arc<CredentialResolver>,
    registry: Arc<ToolRegistry>,
    logger: Arc<dyn Logger>,
}

impl ConfigurationGate {
    pub fn new(resolver: Arc<CredentialResolver>, registry: Arc<ToolRegistry>, logger: Arc<dyn Logger>) -> Self {
        Self {
            resolver,
            registry,
            logger,
        }
    }

    pub fn status(&self, state: &SessionState) -> GateStatus {
        match state.cached() {
            Some(cached) if state.is_configured() => GateStatus::Configured { origin: cached.origin },
            _ => GateStatus::Unconfigured,
        }
    }

    /// Resolve without manual input
    ///
    /// A valid pair from an authoritative source configures the session
    /// directly, since those fields can never be submitted by hand.
    pub async fn refresh(&self, state: &mut SessionState) -> Resolution {
        let resolution = self.resolver.resolve(state, None).await;
        if resolution.is_authoritative() && !state.is_configured() {
            state.mark_configured();
            log_info!(self.logger,
                "[ConfigurationGate] Configured from {}",
                resolution.origin.description()
            );
        }
        resolution
    }

    /// Manual-entry path
    ///
    /// Partial input is rejected with field-level errors and leaves the
    /// session untouched.
    pub async fn submit(
        &self,
        state: &mut SessionState,
        api_key: &str,
        api_endpoint: &str,
    ) -> Result<Resolution, GateError> {
        if let Some(origin) = self.resolver.locked_by(state) {
            return Err(GateError::Locked(origin));
        }

        let pair = CredentialPair::new(api_key.trim(), api_endpoint.trim());
        if let Err(errors) = pair.validate() {
            log_debug!(self.logger,
                "[ConfigurationGate] Rejected manual entry with {} invalid field(s)",
                errors.len()
            );
            return Err(GateError::InvalidFields(errors));
        }

        let resolution = self.resolver.resolve(state, Some(pair)).await;
        if resolution.is_valid() {
            state.mark_configured();
            log_info!(self.logger,
                "[ConfigurationGate] Configured from {}",
                resolution.origin.description()
            );
        }
        Ok(resolution)
    }

    /// Record a user-entered decryption key and resolve again
    pub async fn unlock(&self, state: &mut SessionState, decryption_key: &str) -> Resolution {
        state.set_decryption_key(decryption_key.trim());
        self.refresh(state).await
    }

    /// Forget the pair, its source, and the unlock key
    pub fn reset(&self, state: &mut SessionState) {
        state.clear();
        self.logger.info("[ConfigurationGate] Session reset");
    }

    /// Run a tool with the session's credentials
    pub async fn invoke(
        &self,
        state: &SessionState,
        tool: &str,
        input: &ToolInput,
    ) -> Result<ToolOutcome, GateError> {
        if !state.is_configured() {
            return Err(GateError::NotConfigured);
        }
        let credentials = state
            .cached()
            .and_then(|cached| cached.pair.validate().ok())
            .ok_or(GateError::NotConfigured)?;

        Ok(self.registry.invoke(tool, &credentials, input).await?)
    }

    /// Registered tools in display order
    pub fn tools(&self) -> Vec<ToolInfo> {
        self.registry.tools()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }
}
