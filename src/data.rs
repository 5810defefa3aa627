//! Input records and serialized output shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod io;
pub mod report;

pub use io::*;
pub use report::*;

/// Single published version of a project, as delivered by the release store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    /// Package-level project identifier.
    pub project_id: u64,
    /// Source repository identifier; releases are grouped by this key.
    pub repository_id: u64,
    /// Raw version string as published (e.g. "1.4.2", "2.0.0rc1").
    pub number: String,
    /// Publication time, when known.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// Last time the release store refreshed this row.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Number of runtime dependencies declared by this release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_dependencies_count: Option<u64>,
}

/// Per-repository summary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    /// Source repository identifier.
    pub repository_id: u64,
    /// Package-level project identifier, when the store provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    /// Package platform (e.g. "npm", "pypi", "git").
    pub platform: String,
    /// Number of versions the store knows about.
    pub versions_count: u64,
    /// Last update of the repository.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Release rows and summaries collected for one or more repositories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleaseHistory {
    /// Repository summary rows.
    pub repositories: Vec<RepositorySummary>,
    /// Release rows.
    pub releases: Vec<ReleaseRecord>,
}
