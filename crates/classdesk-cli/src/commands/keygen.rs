//! Implementation of the `classdesk keygen` command.

use std::process::ExitCode;

use anyhow::Result;
use classdesk_core::ConfigKey;
use serde::Serialize;

use crate::output::{output, CommandOutput};

#[derive(Debug, Serialize)]
pub struct KeygenOutput {
    pub key: String,
}

impl CommandOutput for KeygenOutput {
    fn to_human(&self) -> String {
        self.key.clone()
    }
}

pub fn execute(json_mode: bool) -> Result<ExitCode> {
    let key = ConfigKey::generate();
    output(&KeygenOutput { key: key.to_base64() }, json_mode);
    Ok(ExitCode::SUCCESS)
}
