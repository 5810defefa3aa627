//! Detection of concurrently maintained release lines.
//!
//! A project that keeps patching an older major line while shipping a newer
//! one produces a timeline whose major tokens go down again and again
//! (`2 -> 1 -> 3 -> 2 -> 3 -> 1`). A few decreases are explained by late tags
//! or backports, so only [`DEFAULT_DECREASE_THRESHOLD`] or more are taken as
//! parallel lines.

use std::collections::{BTreeMap, BTreeSet};

use super::{ReleaseEvent, Timeline};
use crate::version::major_token;

/// Number of major-token decreases that marks a project as having parallel lines.
pub const DEFAULT_DECREASE_THRESHOLD: usize = 3;

/// Shape of a project's release history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchLayout {
    /// A single release line.
    Linear,
    /// Several major lines maintained side by side; holds every major token seen.
    Parallel(BTreeSet<String>),
}

impl BranchLayout {
    /// Whether parallel lines were detected.
    pub fn is_parallel(&self) -> bool {
        matches!(self, Self::Parallel(_))
    }
}

/// Flags timelines whose major tokens decrease repeatedly.
#[derive(Debug, Clone, Copy)]
pub struct ParallelBranchDetector {
    threshold: usize,
}

impl Default for ParallelBranchDetector {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_DECREASE_THRESHOLD,
        }
    }
}

impl ParallelBranchDetector {
    /// Creates a detector firing after `threshold` decreases (at least one).
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
        }
    }

    /// Decrease count that makes the detector fire.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Inspects the major token sequence of `timeline`.
    pub fn detect(&self, timeline: &Timeline) -> BranchLayout {
        let majors: Vec<&str> = timeline
            .events()
            .iter()
            .map(|e| major_token(&e.version))
            .collect();

        // Textual comparison: "10" < "9".
        let decreases = majors.windows(2).filter(|w| w[0] > w[1]).count();

        if decreases >= self.threshold {
            BranchLayout::Parallel(majors.iter().map(|m| (*m).to_string()).collect())
        } else {
            BranchLayout::Linear
        }
    }
}

/// A timeline split into one sub-timeline per major token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelPartition {
    branches: BTreeMap<String, Vec<ReleaseEvent>>,
}

impl ParallelPartition {
    /// Branches ordered by major token.
    pub fn branches(&self) -> impl Iterator<Item = (&str, &[ReleaseEvent])> {
        self.branches
            .iter()
            .map(|(major, events)| (major.as_str(), events.as_slice()))
    }

    /// Number of branches.
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Whether the partition has no branches.
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

/// Splits `timeline` into per-major sub-timelines.
///
/// Events keep their relative order within a branch. Every token in `majors`
/// gets a branch, even if it has no events.
pub fn track_parallel_versions(timeline: &Timeline, majors: &BTreeSet<String>) -> ParallelPartition {
    let mut branches: BTreeMap<String, Vec<ReleaseEvent>> = majors
        .iter()
        .map(|m| (m.clone(), Vec::new()))
        .collect();

    for event in timeline.events() {
        branches
            .entry(major_token(&event.version).to_string())
            .or_default()
            .push(event.clone());
    }

    ParallelPartition { branches }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::ReleaseKind;

    fn timeline_of(versions: &[&str]) -> Timeline {
        Timeline::from_events(
            versions
                .iter()
                .map(|v| ReleaseEvent {
                    published_at: None,
                    kind: ReleaseKind::Patch,
                    version: (*v).to_string(),
                })
                .collect(),
        )
    }

    fn set(tokens: &[&str]) -> BTreeSet<String> {
        tokens.iter().map(|t| (*t).to_string()).collect()
    }

    #[test]
    fn detects_interleaved_majors() {
        let timeline = timeline_of(&["2.0.1", "1.0.1", "3.0.2", "2.0.3", "3.0.4", "1.0.5"]);
        let layout = ParallelBranchDetector::default().detect(&timeline);
        assert_eq!(layout, BranchLayout::Parallel(set(&["1", "2", "3"])));
    }

    #[test]
    fn two_decreases_are_not_enough() {
        let timeline = timeline_of(&["2.0", "1.0", "3.0", "2.0", "3.0"]);
        let layout = ParallelBranchDetector::default().detect(&timeline);
        assert_eq!(layout, BranchLayout::Linear);
    }

    #[test]
    fn custom_threshold() {
        let timeline = timeline_of(&["2.0", "1.0", "3.0", "2.0", "3.0"]);
        let layout = ParallelBranchDetector::new(2).detect(&timeline);
        assert!(layout.is_parallel());
    }

    #[test]
    fn zero_threshold_still_needs_a_decrease() {
        let detector = ParallelBranchDetector::new(0);
        assert_eq!(detector.threshold(), 1);
        assert_eq!(
            detector.detect(&timeline_of(&["1.0", "2.0"])),
            BranchLayout::Linear
        );
    }

    #[test]
    fn textual_order_of_double_digit_majors() {
        // "10" < "9" as text, so moving from 9 to 10 counts as a decrease.
        let timeline = timeline_of(&["9.0", "10.0", "9.1", "10.1", "9.2", "10.2"]);
        let layout = ParallelBranchDetector::default().detect(&timeline);
        assert_eq!(layout, BranchLayout::Parallel(set(&["10", "9"])));
    }

    #[test]
    fn partition_groups_in_order() {
        let timeline = timeline_of(&["2.0.1", "1.0.1", "3.0.2", "2.0.3", "3.0.4", "1.0.5"]);
        let partition = track_parallel_versions(&timeline, &set(&["1", "2", "3"]));

        let layout: Vec<(&str, Vec<&str>)> = partition
            .branches()
            .map(|(major, events)| {
                (major, events.iter().map(|e| e.version.as_str()).collect())
            })
            .collect();

        assert_eq!(
            layout,
            vec![
                ("1", vec!["1.0.1", "1.0.5"]),
                ("2", vec!["2.0.1", "2.0.3"]),
                ("3", vec!["3.0.2", "3.0.4"]),
            ]
        );
        assert_eq!(partition.len(), 3);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn increasing_majors_never_flag(mut majors in proptest::collection::vec(0u32..10, 0..20)) {
                majors.sort_unstable();
                let versions: Vec<String> = majors.iter().map(|m| format!("{m}.0.0")).collect();
                let refs: Vec<&str> = versions.iter().map(String::as_str).collect();
                let layout = ParallelBranchDetector::default().detect(&timeline_of(&refs));
                prop_assert_eq!(layout, BranchLayout::Linear);
            }

            #[test]
            fn flagged_set_is_exact(majors in proptest::collection::vec(0u32..10, 0..20)) {
                let versions: Vec<String> = majors.iter().map(|m| format!("{m}.1")).collect();
                let refs: Vec<&str> = versions.iter().map(String::as_str).collect();
                let decreases = majors.windows(2).filter(|w| w[0] > w[1]).count();
                let layout = ParallelBranchDetector::default().detect(&timeline_of(&refs));

                if decreases >= DEFAULT_DECREASE_THRESHOLD {
                    let expected: BTreeSet<String> = majors.iter().map(ToString::to_string).collect();
                    prop_assert_eq!(layout, BranchLayout::Parallel(expected));
                } else {
                    prop_assert_eq!(layout, BranchLayout::Linear);
                }
            }
        }
    }
}
