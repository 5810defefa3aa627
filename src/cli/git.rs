//! Git-related CLI commands.

mod tags;

pub use tags::{write_history, TagsCommand};

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Git operations.
#[derive(Parser)]
pub struct GitCommand {
    /// Git subcommand to execute.
    #[command(subcommand)]
    pub command: GitSubcommands,
}

/// Git subcommands.
#[derive(Subcommand)]
pub enum GitSubcommands {
    /// Collects release rows and a repository summary from tags.
    Tags(TagsCommand),
}

impl GitCommand {
    /// Executes the git command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            GitSubcommands::Tags(tags_cmd) => tags_cmd.execute(),
        }
    }
}
