//! Score command: scores release histories loaded from files.

use std::fmt;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use super::parse_format;
use crate::config::ConfigManager;
use crate::data::{metrics_table, read_rows, score_records, ReleaseRecord, RepositorySummary};
use crate::scoring::VersioningScorer;

/// What the score command prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreOutput {
    /// Metrics table with z-score columns.
    #[default]
    Table,
    /// Score records keyed by repository id.
    Records,
}

impl std::str::FromStr for ScoreOutput {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "records" => Ok(Self::Records),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ScoreOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Records => write!(f, "records"),
        }
    }
}

/// Score command options.
#[derive(Parser)]
pub struct ScoreCommand {
    /// Release rows (JSON or YAML, by extension).
    #[arg(long, value_name = "FILE")]
    pub releases: PathBuf,

    /// Repository summary rows (JSON or YAML, by extension).
    #[arg(long, value_name = "FILE")]
    pub repositories: PathBuf,

    /// Scoring configuration file (defaults to $VERSIONING_SCORE_CONFIG, then
    /// ~/.versioning-score/config.yaml).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format: json (default), yaml.
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Output shape: table (default), records.
    #[arg(long, default_value = "table")]
    pub output: String,
}

impl ScoreCommand {
    /// Executes the score command.
    pub fn execute(self) -> Result<()> {
        let rendered = self.render()?;
        println!("{rendered}");
        Ok(())
    }

    /// Runs the batch and renders the requested output.
    pub fn render(&self) -> Result<String> {
        let format = parse_format(&self.format)?;
        let output: ScoreOutput = self.output.parse().map_err(|()| {
            anyhow!(
                "Invalid --output '{}'. Expected table or records",
                self.output
            )
        })?;

        let config = ConfigManager::resolve(self.config.clone()).load()?;
        let scorer = VersioningScorer::new(&config)?;

        let releases: Vec<ReleaseRecord> =
            read_rows(&self.releases).context("Failed to load release rows")?;
        let repositories: Vec<RepositorySummary> =
            read_rows(&self.repositories).context("Failed to load repository rows")?;

        let cohort = scorer
            .score(&releases, &repositories)
            .context("Scoring failed")?
            .normalize();

        match output {
            ScoreOutput::Table => format.render(&metrics_table(&cohort)),
            ScoreOutput::Records => format.render(&score_records(&cohort)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_output() {
        assert_eq!("table".parse::<ScoreOutput>(), Ok(ScoreOutput::Table));
        assert_eq!("Records".parse::<ScoreOutput>(), Ok(ScoreOutput::Records));
        assert_eq!("csv".parse::<ScoreOutput>(), Err(()));
        assert_eq!(ScoreOutput::Records.to_string(), "records");
    }
}
