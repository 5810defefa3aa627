//! Configuration-related CLI commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::ConfigManager;

/// Configuration operations.
#[derive(Parser)]
pub struct ConfigCommand {
    /// Configuration subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Shows the effective scoring configuration.
    Show(ShowCommand),
}

/// Show command options.
#[derive(Parser)]
pub struct ShowCommand {
    /// Scoring configuration file to read instead of the default location.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ConfigCommand {
    /// Executes the config command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            ConfigSubcommands::Show(show_cmd) => show_cmd.execute(),
        }
    }
}

impl ShowCommand {
    /// Executes the show command.
    pub fn execute(self) -> Result<()> {
        println!("{}", self.render()?);
        Ok(())
    }

    /// Renders the effective configuration as YAML, headed by its source path.
    pub fn render(&self) -> Result<String> {
        let manager = ConfigManager::resolve(self.config.clone());
        let config = manager.load()?;
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;

        let source = if manager.config_path().exists() {
            manager.config_path().display().to_string()
        } else {
            format!("{} (not found, using defaults)", manager.config_path().display())
        };

        Ok(format!("# {source}\n{yaml}"))
    }
}
