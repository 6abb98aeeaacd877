//! ClassDesk CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod app;
mod commands;
mod output;

use commands::seal::SealArgs;

/// Environment variable controlling the log filter
const LOG_ENV: &str = "CLASSDESK_LOG";

#[derive(Parser, Debug)]
#[command(name = "classdesk", version, about = "Classroom LLM toolbox")]
pub struct Cli {
    /// Settings file (defaults to ~/.config/classdesk/config.yaml)
    #[arg(long, short, global = true, env = "CLASSDESK_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Answer prompts locally instead of calling the model endpoint
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive session (default)
    Run,
    /// List the configured tools in display order
    Tools,
    /// Print a fresh base64 decryption key
    Keygen,
    /// Encrypt a JSON credential payload into a remote config blob
    Seal(SealArgs),
    /// Resolve credentials once and report where they came from
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let json = cli.json;

    let result = match cli.command.as_ref().unwrap_or(&Commands::Run) {
        Commands::Run => commands::run::execute(&cli).await,
        Commands::Tools => commands::tools::execute(&cli),
        Commands::Keygen => commands::keygen::execute(json),
        Commands::Seal(args) => commands::seal::execute(args, json),
        Commands::Check => commands::check::execute(&cli).await,
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            output::print_error(&err, json);
            ExitCode::FAILURE
        }
    }
}
