//! Lists command - show the lists of a board.

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the lists command.
#[derive(Args, Debug)]
pub struct ListsArgs {
    /// Board ID (defaults to DEFAULT_BOARD_ID / config).
    #[arg(long, short)]
    pub board: Option<String>,

    /// Include closed lists.
    #[arg(long)]
    pub all: bool,
}

/// Runs the lists command.
pub async fn run(args: &ListsArgs, cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let Some(board_id) = args
        .board
        .clone()
        .or_else(|| config.default_board_id.clone())
    else {
        anyhow::bail!("No board given; pass --board or set DEFAULT_BOARD_ID");
    };
    info!(board_id = %board_id, "Listing lists");

    let gateway = taskgate_trello::Gateway::new(&config)?;
    let lists: Vec<_> = gateway
        .board_lists(&board_id)
        .await?
        .into_iter()
        .filter(|l| args.all || !l.closed)
        .collect();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            for list in &lists {
                println!("{}", formatter.format_list_line(list));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_lists(&lists)?);
        }
    }

    Ok(())
}
