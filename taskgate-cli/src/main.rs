// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `TaskGate` CLI - create Trello cards through the gateway.
//!
//! # Examples
//!
//! ```bash
//! # List open boards
//! taskgate boards
//!
//! # Lists of a board (default board when omitted)
//! taskgate lists --board 5f1c0a
//!
//! # Create a card from a JSON write intent
//! taskgate create --intent task.json
//!
//! # Same, reading the intent from stdin
//! echo '{"title":"Kampanya Planı","assignees":["ziya"]}' | taskgate create --intent -
//!
//! # Idempotency fingerprint of a planned write
//! taskgate fingerprint --board 5f1c0a --list 60aa01 --title "Website Analizi" --due 2024-06-01
//!
//! # JSON output
//! taskgate --format json --pretty boards
//! ```

mod commands;
mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use taskgate_store::GatewayConfig;
use taskgate_trello::Gateway;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{boards, config, create, fingerprint, lists};

// ============================================================================
// CLI Definition
// ============================================================================

/// `TaskGate` CLI - rate-limited, deduplicating Trello card writes.
#[derive(Parser)]
#[command(name = "taskgate")]
#[command(about = "Rate-limited, deduplicating Trello gateway")]
#[command(long_about = r#"
TaskGate creates Trello cards without tripping the provider's rate limits
and without writing the same card twice.

Credentials come from the config file or the environment:
  TRELLO_API_KEY, TRELLO_TOKEN, DEFAULT_BOARD_ID, TRELLO_BASE_URL
A .env file in the working directory is read first.

Examples:
  taskgate boards                      # Open boards
  taskgate lists                       # Lists of the default board
  taskgate create --intent task.json   # Create a card
  taskgate --format json create -i -   # Intent from stdin, JSON outcome
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Configuration file (defaults to the user config directory).
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List open boards.
    #[command(visible_alias = "b")]
    Boards,

    /// List the lists of a board.
    #[command(visible_alias = "l")]
    Lists(lists::ListsArgs),

    /// Create a card from a write intent.
    Create(create::CreateArgs),

    /// Print the idempotency fingerprint of a planned write.
    Fingerprint(fingerprint::FingerprintArgs),

    /// Inspect configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
    /// Configuration or credential problem.
    Config = 2,
    /// The provider kept rejecting or failing; retrying later may work.
    Transient = 3,
}

// ============================================================================
// Shared helpers
// ============================================================================

impl Cli {
    /// Returns the configuration path in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(GatewayConfig::default_path)
    }

    /// Loads the configuration file and applies the environment.
    pub fn load_config(&self) -> Result<GatewayConfig> {
        load_config(&self.config_path())
    }

    /// Builds a gateway from the loaded configuration.
    pub fn gateway(&self) -> Result<Gateway> {
        let config = self.load_config()?;
        Gateway::new(&config).context("Failed to set up gateway")
    }
}

fn load_config(path: &Path) -> Result<GatewayConfig> {
    match dotenvy::dotenv() {
        Ok(env_file) => debug!(path = %env_file.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e).context("Failed to read .env"),
    }

    let mut config = GatewayConfig::load_from(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    config.apply_env(|name| std::env::var(name).ok());
    Ok(config)
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let default_filter = if verbose {
        "taskgate=debug,info"
    } else {
        "taskgate=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Boards => boards::run(&cli).await,
        Commands::Lists(args) => lists::run(args, &cli).await,
        Commands::Create(args) => create::run(args, &cli).await,
        Commands::Fingerprint(args) => fingerprint::run(args, &cli),
        Commands::Config(args) => config::run(args, &cli),
    };

    if let Err(e) = result {
        if !cli.quiet {
            let formatter = output::TextFormatter::new(!cli.no_color);
            eprintln!("{}", formatter.format_error(&format!("{e:#}")));
        }
        std::process::exit(exit_code_for(&e) as i32);
    }

    Ok(())
}

fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    use taskgate_store::StoreError;
    use taskgate_trello::{GatewayError, WriteError};

    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<WriteError>() {
            return if e.is_transient() {
                ExitCode::Transient
            } else {
                ExitCode::Error
            };
        }
        if let Some(e) = cause.downcast_ref::<taskgate_fetch::FetchError>() {
            return if e.is_transient() {
                ExitCode::Transient
            } else {
                ExitCode::Error
            };
        }
        if cause.is::<GatewayError>() || cause.is::<StoreError>() {
            return ExitCode::Config;
        }
    }
    ExitCode::Error
}
