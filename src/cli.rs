//! CLI interface for versioning-score.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use crate::data::DataFormat;

pub mod config;
pub mod git;
pub mod score;

/// versioning-score: release history analysis and versioning health scoring.
#[derive(Parser)]
#[command(name = "versioning-score")]
#[command(about = "Scores the versioning health of projects from their release history", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Scores release histories loaded from files.
    Score(score::ScoreCommand),
    /// Collects release rows from git repositories.
    Git(git::GitCommand),
    /// Scoring configuration.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Score(score_cmd) => score_cmd.execute(),
            Commands::Git(git_cmd) => git_cmd.execute(),
            Commands::Config(config_cmd) => config_cmd.execute(),
        }
    }
}

/// Parses a `--format` value.
pub(crate) fn parse_format(s: &str) -> Result<DataFormat> {
    s.parse()
        .map_err(|()| anyhow!("Invalid --format '{s}'. Expected json or yaml"))
}
