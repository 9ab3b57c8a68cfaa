//! Boards command - list open boards.

use anyhow::Result;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the boards command.
pub async fn run(cli: &Cli) -> Result<()> {
    info!("Listing boards");

    let gateway = cli.gateway()?;
    let boards = gateway.list_boards().await?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            println!("{}", formatter.format_boards_header());
            println!("{}", "─".repeat(60));
            for board in &boards {
                println!("{}", formatter.format_board_line(board));
            }
            println!();
            println!("Total: {} open boards", boards.len());
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_boards(&boards)?);
        }
    }

    Ok(())
}
