//! Fingerprint command - print the idempotency fingerprint of a write.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use taskgate_trello::compute_idempotency_fingerprint;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the fingerprint command.
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Board ID.
    #[arg(long)]
    pub board: String,

    /// Destination list ID.
    #[arg(long)]
    pub list: String,

    /// Card title.
    #[arg(long)]
    pub title: String,

    /// Due day (YYYY-MM-DD) or RFC 3339 timestamp.
    #[arg(long)]
    pub due: Option<String>,
}

/// Runs the fingerprint command.
pub fn run(args: &FingerprintArgs, cli: &Cli) -> Result<()> {
    let due = args.due.as_deref().map(parse_due).transpose()?;
    let fingerprint = compute_idempotency_fingerprint(&args.board, &args.list, &args.title, due);

    match cli.format {
        OutputFormat::Text => println!("{fingerprint}"),
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = serde_json::json!({ "fingerprint": fingerprint });
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}

fn parse_due(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid due date: {raw}"))
}
