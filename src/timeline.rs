//! Per-repository release timelines.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::ReleaseRecord;
use crate::scoring::ScoringError;
use crate::version::{ReleaseKind, StructuralVersion};

pub mod parallel;

pub use parallel::{track_parallel_versions, BranchLayout, ParallelBranchDetector, ParallelPartition};

/// Pre-release markers excluded from timelines unless nothing else remains.
pub const DEFAULT_PRERELEASE_MARKERS: &[&str] = &["rc", "dev", "nightly"];

/// A single classified publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    /// Publication time, when known.
    pub published_at: Option<DateTime<Utc>>,
    /// Kind of release relative to the previous event.
    pub kind: ReleaseKind,
    /// Raw version string.
    pub version: String,
}

impl ReleaseEvent {
    /// Structural view of this event's version.
    pub fn structure(&self) -> StructuralVersion {
        StructuralVersion::parse(&self.version)
    }
}

/// Matches version strings carrying a pre-release marker.
#[derive(Debug, Clone)]
pub struct PrereleaseFilter {
    pattern: Regex,
}

impl PrereleaseFilter {
    /// Builds a filter matching any of `markers` as a plain substring.
    pub fn new<S: AsRef<str>>(markers: &[S]) -> Result<Self, ScoringError> {
        if markers.is_empty() {
            return Err(ScoringError::InvalidConfig(
                "at least one pre-release marker is required".to_string(),
            ));
        }

        let alternation = markers
            .iter()
            .map(|m| regex::escape(m.as_ref()))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            pattern: Regex::new(&alternation)?,
        })
    }

    /// Returns true when `version` contains one of the markers.
    pub fn is_prerelease(&self, version: &str) -> bool {
        self.pattern.is_match(version)
    }
}

impl Default for PrereleaseFilter {
    fn default() -> Self {
        // The default markers are plain words, so the alternation always compiles.
        Self::new(DEFAULT_PRERELEASE_MARKERS).expect("default pre-release markers are valid")
    }
}

/// Chronological release events of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    events: Vec<ReleaseEvent>,
}

impl Timeline {
    /// Builds a timeline from all release rows of one repository.
    ///
    /// Pre-release rows are dropped unless every row is a pre-release, in
    /// which case all of them are kept. Rows are ordered by publication time
    /// with undated rows last; ties keep their input order. Returns `None`
    /// when there are no rows at all.
    pub fn build(rows: &[&ReleaseRecord], filter: &PrereleaseFilter) -> Option<Self> {
        let mut kept: Vec<&ReleaseRecord> = rows
            .iter()
            .copied()
            .filter(|r| !filter.is_prerelease(&r.number))
            .collect();

        if kept.is_empty() {
            if !rows.is_empty() {
                debug!(
                    rows = rows.len(),
                    "All releases are pre-releases, keeping them unfiltered"
                );
            }
            kept = rows.to_vec();
        }

        kept.sort_by_key(|r| (r.published_at.is_none(), r.published_at));

        let first = kept.first()?;
        let mut prev = StructuralVersion::parse(&first.number);
        let events = kept
            .iter()
            .map(|row| {
                let curr = StructuralVersion::parse(&row.number);
                let kind = ReleaseKind::classify(&prev, &curr);
                prev = curr;
                ReleaseEvent {
                    published_at: row.published_at,
                    kind,
                    version: row.number.clone(),
                }
            })
            .collect();

        Some(Self { events })
    }

    /// Creates a timeline from already classified events.
    pub fn from_events(events: Vec<ReleaseEvent>) -> Self {
        Self { events }
    }

    /// Events in chronological order.
    pub fn events(&self) -> &[ReleaseEvent] {
        &self.events
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the timeline has no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Earliest event.
    pub fn first(&self) -> Option<&ReleaseEvent> {
        self.events.first()
    }

    /// Number of events of the given kind.
    pub fn count(&self, kind: ReleaseKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}
