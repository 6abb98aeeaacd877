//! Implementation of the `classdesk tools` command.

use std::process::ExitCode;

use anyhow::Result;
use classdesk_core::ToolInfo;
use serde::Serialize;

use super::render;
use crate::app::App;
use crate::output::{output, CommandOutput};
use crate::Cli;

#[derive(Debug, Serialize)]
pub struct ToolsOutput {
    pub tools: Vec<ToolInfo>,
}

impl CommandOutput for ToolsOutput {
    fn to_human(&self) -> String {
        render::tool_lines(&self.tools).join("\n")
    }
}

pub fn execute(cli: &Cli) -> Result<ExitCode> {
    let app = App::load(cli.config.as_deref(), cli.offline)?;
    output(&ToolsOutput { tools: app.gate.tools() }, cli.json);
    Ok(ExitCode::SUCCESS)
}
