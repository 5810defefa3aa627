//! Tags command: turns repository tags into scoring input.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::parse_format;
use crate::data::{DataFormat, ReleaseHistory};
use crate::git::{collect_releases, GitRepository, TagSource, GIT_PLATFORM};

/// Tags command options.
#[derive(Parser)]
pub struct TagsCommand {
    /// Repository to read (defaults to the current directory).
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Repository id written to every row.
    #[arg(long, default_value = "1")]
    pub repository_id: u64,

    /// Project id written to every row (defaults to the repository id).
    #[arg(long)]
    pub project_id: Option<u64>,

    /// Platform recorded in the repository summary.
    #[arg(long, default_value = GIT_PLATFORM)]
    pub platform: String,

    /// Output format: json (default), yaml.
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Writes `releases.<ext>` and `repositories.<ext>` into this directory
    /// instead of printing the combined history.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl TagsCommand {
    /// Executes the tags command.
    pub fn execute(self) -> Result<()> {
        let format = parse_format(&self.format)?;
        let history = self.collect()?;

        match &self.output_dir {
            Some(dir) => {
                let (releases, repositories) = write_history(&history, dir, format)?;
                eprintln!(
                    "Wrote {} release rows to {} and the summary to {}",
                    history.releases.len(),
                    releases.display(),
                    repositories.display()
                );
            }
            None => println!("{}", format.render(&history)?),
        }

        Ok(())
    }

    /// Collects the release history of the selected repository.
    pub fn collect(&self) -> Result<ReleaseHistory> {
        let repo = match &self.path {
            Some(path) => GitRepository::open_at(path)?,
            None => GitRepository::open()?,
        };

        let source = TagSource {
            repository_id: self.repository_id,
            project_id: self.project_id,
            platform: self.platform.clone(),
        };

        collect_releases(&repo, &source)
    }
}

/// Writes the release and repository rows as two files accepted by `score`.
pub fn write_history(
    history: &ReleaseHistory,
    dir: &Path,
    format: DataFormat,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let releases = dir.join(format!("releases.{format}"));
    let repositories = dir.join(format!("repositories.{format}"));

    fs::write(&releases, format.render(&history.releases)?)
        .with_context(|| format!("Failed to write {}", releases.display()))?;
    fs::write(&repositories, format.render(&history.repositories)?)
        .with_context(|| format!("Failed to write {}", repositories.display()))?;

    Ok((releases, repositories))
}
