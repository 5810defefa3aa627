//! Git repository access

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use git2::{Object, Repository};
use tracing::debug;

/// A tag that resolves to a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    /// Short tag name (without `refs/tags/`).
    pub name: String,
    /// Tagger time for annotated tags.
    pub tagged_at: Option<DateTime<Utc>>,
    /// Time of the tagged commit.
    pub committed_at: DateTime<Utc>,
}

impl TagInfo {
    /// Time the tag was published: the tagger time when present, else the commit time.
    pub fn published_at(&self) -> DateTime<Utc> {
        self.tagged_at.unwrap_or(self.committed_at)
    }
}

/// Git repository wrapper
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open repository at current directory
    pub fn open() -> Result<Self> {
        let repo = Repository::open(".").context("Not in a git repository")?;

        Ok(Self { repo })
    }

    /// Open repository at specified path
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path)
            .with_context(|| format!("Failed to open git repository: {}", path.display()))?;

        Ok(Self { repo })
    }

    /// Get workdir path
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Commit time of HEAD; `None` for a repository without commits.
    pub fn head_commit_time(&self) -> Result<Option<DateTime<Utc>>> {
        let Ok(head) = self.repo.head() else {
            return Ok(None);
        };

        let commit = head
            .peel_to_commit()
            .context("Failed to resolve HEAD to a commit")?;
        to_utc(commit.time()).map(Some)
    }

    /// All tags that point (directly or through an annotated tag) at a commit.
    pub fn tags(&self) -> Result<Vec<TagInfo>> {
        let names = self
            .repo
            .tag_names(None)
            .context("Failed to list repository tags")?;

        let mut tags = Vec::new();
        for name in names.iter().flatten() {
            let object = self
                .repo
                .revparse_single(&format!("refs/tags/{name}"))
                .with_context(|| format!("Failed to resolve tag: {name}"))?;

            match self.tag_info(name, &object)? {
                Some(info) => tags.push(info),
                None => debug!(tag = name, "Tag does not point at a commit, ignored"),
            }
        }

        Ok(tags)
    }

    fn tag_info(&self, name: &str, object: &Object<'_>) -> Result<Option<TagInfo>> {
        let tagged_at = match object.as_tag().and_then(git2::Tag::tagger) {
            Some(tagger) => Some(to_utc(tagger.when())?),
            None => None,
        };

        let Ok(commit) = object.peel_to_commit() else {
            return Ok(None);
        };

        Ok(Some(TagInfo {
            name: name.to_string(),
            tagged_at,
            committed_at: to_utc(commit.time())?,
        }))
    }
}

fn to_utc(time: git2::Time) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(time.seconds(), 0).context("Invalid git timestamp")
}
