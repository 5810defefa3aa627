//! Release collection from local git repositories.

pub mod repository;
pub mod tags;

pub use repository::{GitRepository, TagInfo};
pub use tags::{collect_releases, version_from_tag, TagSource, GIT_PLATFORM};
