//! Scoring error handling.

use thiserror::Error;

/// Failures the scoring pipeline reports to its caller.
///
/// Data quirks (odd version strings, missing dates, pre-release-only
/// histories) never show up here; they are resolved inside the pipeline.
#[derive(Error, Debug)]
pub enum ScoringError {
    /// Release rows reference a repository with no summary row.
    #[error("No repository summary found for repository {repository_id}")]
    MissingSummary {
        /// Repository the release rows belong to.
        repository_id: u64,
    },

    /// Scoring configuration is unusable.
    #[error("Invalid scoring configuration: {0}")]
    InvalidConfig(String),

    /// Pre-release markers could not be compiled into a matcher.
    #[error("Invalid pre-release marker pattern: {0}")]
    InvalidMarker(#[from] regex::Error),
}
