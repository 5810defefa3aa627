//! Release rows collected from repository tags.

use anyhow::Result;
use tracing::{debug, info};

use super::repository::{GitRepository, TagInfo};
use crate::data::{ReleaseHistory, ReleaseRecord, RepositorySummary};

/// Platform recorded for repositories collected from git.
pub const GIT_PLATFORM: &str = "git";

/// Identity given to the collected rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSource {
    /// Repository id written to every row.
    pub repository_id: u64,
    /// Project id; defaults to the repository id.
    pub project_id: Option<u64>,
    /// Platform name for the summary row.
    pub platform: String,
}

impl Default for TagSource {
    fn default() -> Self {
        Self {
            repository_id: 1,
            project_id: None,
            platform: GIT_PLATFORM.to_string(),
        }
    }
}

/// Version string carried by a tag name: `v1.2.3` and `V1.2.3` become `1.2.3`.
///
/// The prefix is only dropped when a digit follows, so `very-old` stays as is.
pub fn version_from_tag(name: &str) -> &str {
    match name.strip_prefix(['v', 'V']) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => name,
    }
}

/// Builds release rows and a repository summary from tags.
///
/// Tags are emitted in publication order. The HEAD commit time is recorded
/// as the last update of the repository and of every row.
pub fn collect_releases(repo: &GitRepository, source: &TagSource) -> Result<ReleaseHistory> {
    let mut tags = repo.tags()?;
    tags.sort_by(|a, b| {
        a.published_at()
            .cmp(&b.published_at())
            .then_with(|| a.name.cmp(&b.name))
    });

    let updated_at = repo.head_commit_time()?;
    let project_id = source.project_id.unwrap_or(source.repository_id);

    debug!(
        workdir = ?repo.workdir(),
        tags = tags.len(),
        "Collected tags"
    );

    let releases: Vec<ReleaseRecord> = tags
        .iter()
        .map(|tag: &TagInfo| ReleaseRecord {
            project_id,
            repository_id: source.repository_id,
            number: version_from_tag(&tag.name).to_string(),
            published_at: Some(tag.published_at()),
            updated_at,
            runtime_dependencies_count: None,
        })
        .collect();

    info!(
        repository_id = source.repository_id,
        releases = releases.len(),
        "Release rows built from tags"
    );

    Ok(ReleaseHistory {
        repositories: vec![RepositorySummary {
            repository_id: source.repository_id,
            project_id: Some(project_id),
            platform: source.platform.clone(),
            versions_count: releases.len() as u64,
            updated_at,
        }],
        releases,
    })
}
