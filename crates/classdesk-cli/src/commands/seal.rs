//! Implementation of the `classdesk seal` command.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use classdesk_core::remote::{crypto, parse_payload};
use classdesk_core::resolver::DEFAULT_DECRYPTION_KEY_ENV;
use classdesk_core::ConfigKey;
use serde::Serialize;

use crate::output::{output, CommandOutput};

#[derive(Args, Debug)]
pub struct SealArgs {
    /// JSON file with `api_key` and `api_endpoint`
    #[arg(long, short)]
    pub input: PathBuf,

    /// Where to write the encrypted blob
    #[arg(long, short)]
    pub output: PathBuf,

    /// Base64 key (prefer --key-env so the key stays out of shell history)
    #[arg(long, conflicts_with = "key_env")]
    pub key: Option<String>,

    /// Environment variable holding the base64 key
    #[arg(long, default_value = DEFAULT_DECRYPTION_KEY_ENV)]
    pub key_env: String,
}

#[derive(Debug, Serialize)]
pub struct SealOutput {
    pub output: PathBuf,
    pub bytes: usize,
}

impl CommandOutput for SealOutput {
    fn to_human(&self) -> String {
        format!("Wrote {} encrypted bytes to {}", self.bytes, self.output.display())
    }
}

pub fn execute(args: &SealArgs, json_mode: bool) -> Result<ExitCode> {
    let encoded = match &args.key {
        Some(key) => key.clone(),
        None => std::env::var(&args.key_env)
            .map_err(|_| anyhow!("No key given and {} is not set", args.key_env))?,
    };
    let key = ConfigKey::from_base64(encoded.trim()).context("Invalid decryption key")?;

    let payload = fs::read(&args.input).with_context(|| format!("Failed to read {}", args.input.display()))?;
    // Refuse to produce a blob that would decrypt to a malformed payload
    parse_payload(&payload).context("Input is not a valid credential payload")?;

    let blob = crypto::seal(&key, &payload).context("Encryption failed")?;
    fs::write(&args.output, &blob).with_context(|| format!("Failed to write {}", args.output.display()))?;

    output(
        &SealOutput {
            output: args.output.clone(),
            bytes: blob.len(),
        },
        json_mode,
    );
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_writes_openable_blob() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("creds.json");
        let out = dir.path().join("creds.bin");
        fs::write(&input, r#"{"api_key":"k1","api_endpoint":"https://e"}"#).unwrap();

        let key = ConfigKey::generate();
        let args = SealArgs {
            input,
            output: out.clone(),
            key: Some(key.to_base64()),
            key_env: DEFAULT_DECRYPTION_KEY_ENV.to_string(),
        };
        execute(&args, true).unwrap();

        let blob = fs::read(&out).unwrap();
        let plaintext = crypto::open(&key, &blob).unwrap();
        let pair = parse_payload(&plaintext).unwrap();
        assert_eq!(pair.api_key, "k1");
        assert_eq!(pair.api_endpoint, "https://e");
    }

    #[test]
    fn test_seal_rejects_malformed_payload() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("creds.json");
        fs::write(&input, r#"{"api_key":"k1"}"#).unwrap();

        let args = SealArgs {
            input,
            output: dir.path().join("creds.bin"),
            key: Some(ConfigKey::generate().to_base64()),
            key_env: DEFAULT_DECRYPTION_KEY_ENV.to_string(),
        };
        assert!(execute(&args, true).is_err());
        assert!(!dir.path().join("creds.bin").exists());
    }
}
