//! Implementation of the `classdesk run` interactive session.
//!
//! One line is read and handled to completion before the next is accepted.

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use classdesk_core::types::mask_secret;
use classdesk_core::{
    ConfigurationGate, CredentialPair, CredentialSource, GateError, SessionState, ToolInfo, ToolInput, ToolOutcome,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use super::render;
use crate::app::App;
use crate::Cli;

const HELP: &str = "\
Commands:
  status              Show configuration status and credential fields
  key <value>         Enter the API key
  endpoint <value>    Enter the API endpoint
  submit              Save the entered key and endpoint
  unlock <key>        Unlock the remote configuration with a decryption key
  tools               List available tools
  use <n|name>        Run a tool
  reset               Forget all credentials for this session
  help                Show this help
  quit                Exit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Status,
    Key(String),
    Endpoint(String),
    Submit,
    Unlock(String),
    Tools,
    Use(String),
    Reset,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim().to_string()),
        None => (line, String::new()),
    };
    match head.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "status" => Command::Status,
        "key" => Command::Key(rest),
        "endpoint" => Command::Endpoint(rest),
        "submit" => Command::Submit,
        "unlock" => Command::Unlock(rest),
        "tools" => Command::Tools,
        "use" => Command::Use(rest),
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

/// Find a tool by 1-based position, name, or title
fn find_tool<'t>(tools: &'t [ToolInfo], selector: &str) -> Option<&'t ToolInfo> {
    if let Ok(n) = selector.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| tools.get(i));
    }
    tools.iter().find(|t| {
        t.name.eq_ignore_ascii_case(selector) || t.descriptor.title.eq_ignore_ascii_case(selector)
    })
}

struct Session<'a, R, W> {
    gate: &'a ConfigurationGate,
    state: SessionState,
    /// Manual entry in progress, not yet submitted
    draft: CredentialPair,
    input: Lines<R>,
    out: W,
}

impl<'a, R, W> Session<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    fn new(gate: &'a ConfigurationGate, input: R, out: W) -> Self {
        Self {
            gate,
            state: SessionState::new(),
            draft: CredentialPair::empty(),
            input: input.lines(),
            out,
        }
    }

    fn say(&mut self, text: impl std::fmt::Display) -> Result<()> {
        writeln!(self.out, "{}", text).context("Failed to write output")
    }

    async fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{}", prompt).context("Failed to write output")?;
        self.out.flush().context("Failed to write output")?;
        self.input.next_line().await.context("Failed to read input")
    }

    async fn run(&mut self) -> Result<()> {
        tracing::info!(tools = self.gate.tools().len(), "Interactive session started");
        self.say("ClassDesk. Type 'help' for commands.")?;
        self.show_status().await?;

        while let Some(line) = self.read_line("> ").await? {
            match parse_command(&line) {
                Command::Empty => {}
                Command::Status => self.show_status().await?,
                Command::Key(value) => self.edit_field(value, true)?,
                Command::Endpoint(value) => self.edit_field(value, false)?,
                Command::Submit => self.submit().await?,
                Command::Unlock(key) => self.unlock(&key).await?,
                Command::Tools => {
                    let lines = render::tool_lines(&self.gate.tools()).join("\n");
                    self.say(lines)?;
                }
                Command::Use(selector) => self.use_tool(&selector).await?,
                Command::Reset => {
                    self.gate.reset(&mut self.state);
                    self.draft = CredentialPair::empty();
                    tracing::debug!("Draft credentials cleared");
                    self.say("Session cleared.")?;
                    self.show_status().await?;
                }
                Command::Help => self.say(HELP)?,
                Command::Quit => break,
                Command::Unknown(cmd) => self.say(format!("Unknown command '{}'. Type 'help' for commands.", cmd))?,
            }
        }
        tracing::info!("Interactive session ended");
        Ok(())
    }

    async fn show_status(&mut self) -> Result<()> {
        let resolution = self.gate.refresh(&mut self.state).await;
        let status = self.gate.status(&self.state);
        self.say(render::resolution_lines(&status, &resolution).join("\n"))
    }

    fn edit_field(&mut self, value: String, is_key: bool) -> Result<()> {
        if let Some(origin) = self.gate.resolver().locked_by(&self.state) {
            return self.say(GateError::Locked(origin).user_message());
        }
        if is_key {
            self.say(format!("API key set: {}", mask_secret(&value)))?;
            self.draft.api_key = value;
        } else {
            self.say(format!("API endpoint set: {}", value))?;
            self.draft.api_endpoint = value;
        }
        Ok(())
    }

    async fn submit(&mut self) -> Result<()> {
        // Fields not entered this time keep their current value
        if let Some(cached) = self.state.cached() {
            if self.draft.api_key.trim().is_empty() {
                self.draft.api_key = cached.pair.api_key.clone();
            }
            if self.draft.api_endpoint.trim().is_empty() {
                self.draft.api_endpoint = cached.pair.api_endpoint.clone();
            }
        }

        match self
            .gate
            .submit(&mut self.state, &self.draft.api_key, &self.draft.api_endpoint)
            .await
        {
            Ok(resolution) => {
                self.draft = CredentialPair::empty();
                let status = self.gate.status(&self.state);
                self.say(render::resolution_lines(&status, &resolution).join("\n"))
            }
            Err(GateError::InvalidFields(errors)) => {
                for error in errors {
                    self.say(format!("  {}: {}", error.field, error.message))?;
                }
                Ok(())
            }
            Err(e) => self.say(e.user_message()),
        }
    }

    async fn unlock(&mut self, key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return self.say("Usage: unlock <key>");
        }
        if self.gate.resolver().remote().is_none() {
            return self.say("No remote configuration is set up, so there is nothing to unlock.");
        }
        // The remote config is only fetched while nothing is cached
        match self.gate.resolver().locked_by(&self.state) {
            Some(CredentialSource::Static) => {
                return self.say("Pre-provisioned secrets are in use; the remote configuration is not needed.");
            }
            Some(_) => return self.say("The remote configuration is already unlocked."),
            None => {}
        }
        if self.state.cached().is_some() {
            return self.say("Manually entered credentials are in use, so the key was not applied. Use reset first, then unlock.");
        }

        let resolution = self.gate.unlock(&mut self.state, key).await;
        let status = self.gate.status(&self.state);
        self.say(render::resolution_lines(&status, &resolution).join("\n"))
    }

    async fn use_tool(&mut self, selector: &str) -> Result<()> {
        let tools = self.gate.tools();
        let Some(tool) = find_tool(&tools, selector) else {
            return self.say(format!("No tool '{}'. Type 'tools' to list them.", selector));
        };
        if !self.gate.status(&self.state).is_configured() {
            return self.say(GateError::NotConfigured.user_message());
        }

        self.say(&tool.descriptor.title)?;
        self.say(&tool.descriptor.description)?;
        let mut input = ToolInput::new();
        for field in &tool.descriptor.fields {
            let prompt = render::field_prompt(&field.label, &field.kind);
            let Some(value) = self.read_line(&prompt).await? else {
                return Ok(());
            };
            input.set(field.name.clone(), value);
        }

        match self.gate.invoke(&self.state, &tool.name, &input).await {
            Ok(ToolOutcome::Rendered(output)) => self.say(format!("\n{}\n{}\n", output.title, output.body)),
            Ok(ToolOutcome::Failed(failure)) => {
                self.say(format!("{} failed: {}", tool.descriptor.title, failure.message))
            }
            Err(e) => self.say(e.user_message()),
        }
    }
}

pub async fn execute(cli: &Cli) -> Result<ExitCode> {
    let app = App::load(cli.config.as_deref(), cli.offline)?;
    let mut session = Session::new(&app.gate, BufReader::new(tokio::io::stdin()), std::io::stdout());
    session.run().await?;
    Ok(ExitCode::SUCCESS)
}
