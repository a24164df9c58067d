use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use congestion_core::{ApiConfig, provider_from_config, registry};
use inquire::{Password, PasswordDisplayMode, Text};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "congestion", version, about = "Seoul real-time congestion CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the Seoul Open API key and request settings.
    Configure,

    /// Show live congestion and forecast for an area.
    Show {
        /// Canonical area name, e.g. "강남역".
        area: String,

        /// Print the record as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// List known area names.
    Areas {
        /// Only names starting with this prefix.
        prefix: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { area, json } => show(&area, json).await,
            Command::Areas { prefix } => {
                for name in registry::suggest(prefix.as_deref().unwrap_or_default()) {
                    println!("{name}");
                }
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = ApiConfig::load()?;

    let api_key = Password::new("Seoul Open API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    config.base_url = Text::new("Base URL:").with_default(&config.base_url).prompt()?;
    config.request_type = Text::new("Request type:").with_default(&config.request_type).prompt()?;
    config.service_name = Text::new("Service name:").with_default(&config.service_name).prompt()?;
    config.start_index = Text::new("Start index:").with_default(&config.start_index).prompt()?;
    config.end_index = Text::new("End index:").with_default(&config.end_index).prompt()?;

    config.require_api_key()?;
    config.save()?;

    println!("Saved configuration to {}", ApiConfig::config_file_path()?.display());
    Ok(())
}

async fn show(area: &str, json: bool) -> anyhow::Result<()> {
    let config = ApiConfig::load()?.with_env_overrides();
    let provider = provider_from_config(&config)?;

    let record = match provider.get_congestion_info(area).await {
        Ok(record) => record,
        Err(err) => bail!("[{}] {}", err.status_code(), err),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", render::record_table(&record));
    }

    Ok(())
}
