use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Select, Text};
use seniverse_core::{AuthScheme, Config, Forecaster, config::MAX_DAYS};
use tracing::{debug, info};

const SHOW_EXAMPLES: &str = "\
Examples:
  weather show 北京
  weather show 北京 5
  weather show 北京/朝阳";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Seniverse daily forecast")]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure base URL, credentials and defaults.
    Configure,

    /// Show the daily forecast for a city.
    #[command(after_help = SHOW_EXAMPLES)]
    Show {
        /// City name; districts as "北京/朝阳".
        city: String,

        /// Number of days; the configured default when absent.
        #[arg(allow_hyphen_values = true)]
        day: Option<String>,
    },
}

pub fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

impl Cli {
    /// `--config` if given, otherwise the platform default.
    pub fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::config_file_path(),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let path = self.config_path()?;
        let config = Config::load_from(&path)?;
        debug!(path = %path.display(), ?config, "loaded configuration");

        match self.command {
            Command::Configure => {
                let updated = prompt_config(config)?;
                updated.validate()?;
                updated.save_to(&path)?;
                info!(path = %path.display(), scheme = %updated.auth_scheme, "configuration saved");
                println!("Saved configuration to {}", path.display());
            }
            Command::Show { city, day } => {
                let forecaster = Forecaster::from_config(config)?;
                let reply = forecaster.reply(&city, day.as_deref()).await;
                println!("{}", reply.trim_end());
            }
        }

        Ok(())
    }
}

fn prompt_config(mut cfg: Config) -> anyhow::Result<Config> {
    cfg.base_url = Text::new("API base URL:")
        .with_default(&cfg.base_url)
        .prompt()
        .context("Failed to read base URL")?;

    let schemes = AuthScheme::all().to_vec();
    let cursor = schemes.iter().position(|s| *s == cfg.auth_scheme).unwrap_or_default();
    cfg.auth_scheme = Select::new("Auth scheme (public is recommended):", schemes)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read auth scheme")?;

    let private_key = Password::new("Private key (needed by both schemes, empty keeps current):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read private key")?;
    if !private_key.is_empty() {
        cfg.private_key = private_key;
    }

    if cfg.auth_scheme == AuthScheme::Public {
        cfg.public_key = Text::new("Public key:")
            .with_default(&cfg.public_key)
            .prompt()
            .context("Failed to read public key")?;
    }

    cfg.default_days = CustomType::<u32>::new(&format!("Default number of days (0-{MAX_DAYS}):"))
        .with_default(cfg.default_days)
        .with_error_message("Please type a whole number")
        .prompt()
        .context("Failed to read default days")?;

    Ok(cfg)
}
