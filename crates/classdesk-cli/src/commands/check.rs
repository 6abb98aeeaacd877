//! Implementation of the `classdesk check` command.

use std::process::ExitCode;

use anyhow::Result;
use classdesk_core::{GateStatus, Resolution, SessionState};
use serde::Serialize;

use super::render;
use crate::app::App;
use crate::output::{output, CommandOutput};
use crate::Cli;

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub status: GateStatus,
    pub resolution: Resolution,
    /// User-facing remote configuration failure, if any
    pub error: Option<String>,
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        render::resolution_lines(&self.status, &self.resolution).join("\n")
    }
}

/// Exit code 2 means the session would start unconfigured
pub async fn execute(cli: &Cli) -> Result<ExitCode> {
    let app = App::load(cli.config.as_deref(), cli.offline)?;
    let mut state = SessionState::new();

    let resolution = app.gate.refresh(&mut state).await;
    let status = app.gate.status(&state);
    let configured = status.is_configured();

    let error = resolution.error.as_ref().map(|e| e.user_message());
    output(
        &CheckOutput {
            status,
            resolution,
            error,
        },
        cli.json,
    );

    Ok(if configured { ExitCode::SUCCESS } else { ExitCode::from(2) })
}
