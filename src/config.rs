//! Scoring configuration.
//!
//! The configuration file is looked up in this order:
//!
//! 1. an explicit path (`--config`),
//! 2. the `VERSIONING_SCORE_CONFIG` environment variable,
//! 3. `$HOME/.versioning-score/config.yaml`.
//!
//! A missing file means built-in defaults. Both YAML and JSON are accepted.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::io::read_file;
use crate::scoring::ScoringError;
use crate::timeline::parallel::DEFAULT_DECREASE_THRESHOLD;
use crate::timeline::DEFAULT_PRERELEASE_MARKERS;

/// Environment variable pointing at the configuration file.
pub const CONFIG_PATH_ENV: &str = "VERSIONING_SCORE_CONFIG";

/// What to do with release rows whose repository has no summary row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingSummaryPolicy {
    /// Fail the whole batch.
    #[default]
    Abort,
    /// Leave the repository out and keep going.
    Skip,
}

/// Tunable scoring parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Major-token decreases needed to treat a project as running parallel lines.
    pub parallel_decrease_threshold: usize,
    /// Substrings marking pre-release versions.
    pub prerelease_markers: Vec<String>,
    /// Handling of release rows without a repository summary.
    pub on_missing_summary: MissingSummaryPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            parallel_decrease_threshold: DEFAULT_DECREASE_THRESHOLD,
            prerelease_markers: DEFAULT_PRERELEASE_MARKERS
                .iter()
                .map(ToString::to_string)
                .collect(),
            on_missing_summary: MissingSummaryPolicy::Abort,
        }
    }
}

impl ScoringConfig {
    /// Checks the parameters are usable.
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.parallel_decrease_threshold == 0 {
            return Err(ScoringError::InvalidConfig(
                "parallel_decrease_threshold must be at least 1".to_string(),
            ));
        }

        if self.prerelease_markers.is_empty() {
            return Err(ScoringError::InvalidConfig(
                "prerelease_markers must not be empty".to_string(),
            ));
        }

        if let Some(i) = self.prerelease_markers.iter().position(String::is_empty) {
            return Err(ScoringError::InvalidConfig(format!(
                "prerelease_markers[{i}] is an empty string"
            )));
        }

        Ok(())
    }
}

/// Locates and loads the scoring configuration.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }
}

impl ConfigManager {
    /// Creates a manager for an explicit path, the environment, or the default.
    pub fn resolve(explicit: Option<PathBuf>) -> Self {
        Self::resolve_with(explicit, env::var(CONFIG_PATH_ENV).ok())
    }

    fn resolve_with(explicit: Option<PathBuf>, from_env: Option<String>) -> Self {
        let config_path = explicit
            .or_else(|| {
                from_env
                    .filter(|p| !p.trim().is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(Self::default_config_path);

        Self { config_path }
    }

    /// Creates a manager for a specific file.
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Returns the default configuration path (~/.versioning-score/config.yaml).
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".versioning-score")
            .join("config.yaml")
    }

    /// Path this manager reads from.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads and validates the configuration, falling back to defaults when
    /// the file does not exist.
    pub fn load(&self) -> Result<ScoringConfig> {
        if !self.config_path.exists() {
            tracing::debug!(
                path = %self.config_path.display(),
                "No scoring configuration file, using defaults"
            );
            return Ok(ScoringConfig::default());
        }

        let config: ScoringConfig = read_file(&self.config_path).with_context(|| {
            format!(
                "Failed to load scoring configuration: {}",
                self.config_path.display()
            )
        })?;

        config.validate().with_context(|| {
            format!(
                "Invalid scoring configuration: {}",
                self.config_path.display()
            )
        })?;

        Ok(config)
    }
}
