//! # versioning-score
//!
//! Versioning health scoring for open source projects.
//!
//! A project's release history is turned into a timeline of major, minor
//! and patch releases. Projects that maintain several release lines at
//! once are split per line before release intervals are measured. Release
//! counts, mean intervals and release frequencies are each squeezed into a
//! `[0, 1)` sub-score and averaged into a 0-100 versioning score, and every
//! derived metric gets a z-score across the batch.
//!
//! ## Quick Start
//!
//! ```rust
//! use versioning_score::data::{ReleaseRecord, RepositorySummary};
//! use versioning_score::scoring::VersioningScorer;
//!
//! let releases = vec![ReleaseRecord {
//!     project_id: 1,
//!     repository_id: 1,
//!     number: "1.0.0".to_string(),
//!     published_at: None,
//!     updated_at: None,
//!     runtime_dependencies_count: None,
//! }];
//! let repositories = vec![RepositorySummary {
//!     repository_id: 1,
//!     project_id: Some(1),
//!     platform: "npm".to_string(),
//!     versions_count: 1,
//!     updated_at: None,
//! }];
//!
//! let run = VersioningScorer::default().score(&releases, &repositories).unwrap();
//! assert_eq!(run.projects[&1].versioning_score, 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod data;
pub mod git;
pub mod scoring;
pub mod timeline;
pub mod version;

pub use crate::cli::Cli;
pub use crate::config::ScoringConfig;
pub use crate::scoring::{ScoringError, VersioningScorer};

/// The current version of versioning-score.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
