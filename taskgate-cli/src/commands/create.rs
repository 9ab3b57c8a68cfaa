//! Create command - write one card from a JSON intent.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use taskgate_core::WriteIntent;
use tracing::{debug, info};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the create command.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Write intent as JSON, or `-` for stdin.
    #[arg(long, short)]
    pub intent: PathBuf,

    /// Overrides the intent's board.
    #[arg(long, short)]
    pub board: Option<String>,
}

/// Runs the create command.
pub async fn run(args: &CreateArgs, cli: &Cli) -> Result<()> {
    let raw = read_intent(&args.intent)?;
    let mut intent = parse_intent(&raw)?;
    if let Some(board) = &args.board {
        intent.board_id = Some(board.clone());
    }
    debug!(intent = ?intent, "Parsed write intent");

    let gateway = cli.gateway()?;
    let outcome = gateway.create_task(intent).await?;
    info!(card_id = %outcome.card.id, created = outcome.created, "Create finished");

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_outcome(&outcome));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_outcome(&outcome)?);
        }
    }

    gateway.shutdown();
    Ok(())
}

fn read_intent(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read intent from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read intent from {}", path.display()))
}

fn parse_intent(raw: &str) -> Result<WriteIntent> {
    serde_json::from_str(raw).context("Intent is not a valid write intent")
}
