//! Config command - inspect configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use taskgate_store::{ENV_API_KEY, ENV_BASE_URL, ENV_DEFAULT_BOARD, ENV_TOKEN, GatewayConfig};

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration, credentials redacted.
    Show,

    /// Show the configuration path.
    Path,

    /// Check the configuration without calling the provider.
    Check,

    /// Write the default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_path(cli),
        ConfigAction::Check => check_config(cli),
        ConfigAction::Init { force } => init_config(cli, *force),
    }
}

fn redacted(config: &GatewayConfig) -> GatewayConfig {
    let mask = |v: &Option<String>| v.as_ref().map(|_| "********".to_string());
    GatewayConfig {
        api_key: mask(&config.api_key),
        token: mask(&config.token),
        ..config.clone()
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let config = redacted(&cli.load_config()?);

    match cli.format {
        OutputFormat::Text => {
            let unset = "(unset)";
            println!("TaskGate Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("API key:        {}", config.api_key.as_deref().unwrap_or(unset));
            println!("Token:          {}", config.token.as_deref().unwrap_or(unset));
            println!(
                "Default board:  {}",
                config.default_board_id.as_deref().unwrap_or(unset)
            );
            println!("Base URL:       {}", config.base_url);
            println!("Timeout:        {}s", config.request_timeout_secs);
            println!(
                "General bucket: {} per {}ms, {}ms spacing",
                config.limits.general.capacity,
                config.limits.general.refill_interval_ms,
                config.limits.general.min_time_ms
            );
            println!(
                "Members bucket: {} per {}ms, {}ms spacing",
                config.limits.restricted.capacity,
                config.limits.restricted.refill_interval_ms,
                config.limits.restricted.min_time_ms
            );
            println!(
                "Cache:          {} entries, {}s TTL",
                config.cache.capacity, config.cache.ttl_secs
            );
            println!("Extra aliases:  {}", config.writer.aliases.len());
            println!();
            println!(
                "Environment overrides: {ENV_API_KEY}, {ENV_TOKEN}, {ENV_DEFAULT_BOARD}, {ENV_BASE_URL}"
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&config)?);
        }
    }

    Ok(())
}

fn show_path(cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    match cli.format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let output = serde_json::json!({
                "config_file": path.display().to_string(),
                "exists": path.exists(),
            });
            println!("{}", formatter.format(&output)?);
        }
    }

    Ok(())
}

fn check_config(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    config.validate()?;
    config.credentials()?;
    println!("Configuration OK");
    Ok(())
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = cli.config_path();
    if path.exists() && !force {
        anyhow::bail!("{} already exists; pass --force to overwrite", path.display());
    }
    GatewayConfig::default().save_to(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction_keeps_presence() {
        let config = GatewayConfig {
            api_key: Some("key".to_string()),
            token: None,
            default_board_id: Some("b1".to_string()),
            ..GatewayConfig::default()
        };
        let shown = redacted(&config);
        assert_eq!(shown.api_key.as_deref(), Some("********"));
        assert!(shown.token.is_none());
        assert_eq!(shown.default_board_id.as_deref(), Some("b1"));
    }
}
