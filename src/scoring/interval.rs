//! Inter-release intervals and the weighted mean-time sub-score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{finite_or_zero, round2, saturate};
use crate::timeline::{ParallelPartition, ReleaseEvent, Timeline};
use crate::version::{ReleaseKind, StructuralVersion};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Mean-time weights per release kind.
const MAJOR_WEIGHT: f64 = 6.0;
const MINOR_WEIGHT: f64 = 4.0;
const PATCH_WEIGHT: f64 = 2.0;

/// Days between two publications.
///
/// `None` when either date is missing or the gap is exactly zero: same-day
/// tags would otherwise drag every mean towards zero.
pub fn gap_days(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Option<f64> {
    let (from, to) = (from?, to?);
    let days = (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY;
    (days != 0.0).then_some(days)
}

/// Gaps collected per release kind; `None` entries are unknown gaps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapBuckets {
    /// Gaps closed by major releases.
    pub major: Vec<Option<f64>>,
    /// Gaps closed by minor releases.
    pub minor: Vec<Option<f64>>,
    /// Gaps closed by patch releases.
    pub patch: Vec<Option<f64>>,
}

impl GapBuckets {
    /// Walks a single-line timeline, routing each gap by the later event's kind.
    pub fn linear(timeline: &Timeline) -> Self {
        let mut buckets = Self::default();
        for pair in timeline.events().windows(2) {
            let gap = gap_days(pair[0].published_at, pair[1].published_at);
            buckets.push(pair[1].kind, gap);
        }
        buckets
    }

    /// Walks each branch of a parallel partition.
    ///
    /// Major gaps run between the first releases of consecutive branches in
    /// token order. Minor and patch gaps are tracked inside each branch.
    pub fn parallel(partition: &ParallelPartition) -> Self {
        let mut buckets = Self::default();
        let mut prev_branch_start: Option<Option<DateTime<Utc>>> = None;

        for (_, events) in partition.branches() {
            let Some((first, rest)) = events.split_first() else {
                continue;
            };

            if let Some(prev_start) = prev_branch_start {
                buckets.major.push(gap_days(prev_start, first.published_at));
            }
            prev_branch_start = Some(first.published_at);

            let mut cursor = BranchCursor::new(first);
            for event in rest {
                cursor.advance(event, &mut buckets);
            }
        }

        buckets
    }

    fn push(&mut self, kind: ReleaseKind, gap: Option<f64>) {
        match kind {
            ReleaseKind::Major => self.major.push(gap),
            ReleaseKind::Minor => self.minor.push(gap),
            ReleaseKind::Patch => self.patch.push(gap),
            ReleaseKind::First => {}
        }
    }

    /// Per-bucket means over the known gaps.
    pub fn means(&self) -> BucketMeans {
        BucketMeans {
            major: mean_of_known(&self.major),
            minor: mean_of_known(&self.minor),
            patch: mean_of_known(&self.patch),
        }
    }
}

fn mean_of_known(gaps: &[Option<f64>]) -> Option<f64> {
    let known: Vec<f64> = gaps.iter().flatten().copied().collect();
    if known.is_empty() {
        return None;
    }
    Some(round2(known.iter().sum::<f64>() / known.len() as f64))
}

/// Position inside one major branch while walking it.
#[derive(Debug)]
struct BranchCursor {
    prev: StructuralVersion,
    minor_since: Option<DateTime<Utc>>,
    patch_since: Option<DateTime<Utc>>,
}

impl BranchCursor {
    fn new(first: &ReleaseEvent) -> Self {
        Self {
            prev: first.structure(),
            minor_since: first.published_at,
            patch_since: first.published_at,
        }
    }

    fn advance(&mut self, event: &ReleaseEvent, buckets: &mut GapBuckets) {
        let curr = event.structure();
        let date = event.published_at;

        if curr.minor > self.prev.minor {
            buckets.minor.push(gap_days(self.minor_since, date));
            self.minor_since = date;
            self.patch_since = date;
        } else if curr.rest > self.prev.rest {
            buckets.patch.push(gap_days(self.patch_since, date));
            self.patch_since = date;
        }

        self.prev = curr;
    }
}

/// Mean gap in days per release kind; `None` when no gap was known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketMeans {
    /// Mean days before a major release.
    pub major: Option<f64>,
    /// Mean days before a minor release.
    pub minor: Option<f64>,
    /// Mean days before a patch release.
    pub patch: Option<f64>,
}

impl BucketMeans {
    /// Weighted mean-time sub-score in `[0, 1)`.
    ///
    /// Shorter means score higher. Buckets without a mean, or with a zero
    /// mean, add nothing.
    pub fn weighted_score(&self) -> f64 {
        let total: f64 = [
            (MAJOR_WEIGHT, self.major),
            (MINOR_WEIGHT, self.minor),
            (PATCH_WEIGHT, self.patch),
        ]
        .iter()
        .filter_map(|(weight, mean)| mean.filter(|m| *m != 0.0).map(|m| weight / m))
        .sum();

        finite_or_zero(round2(saturate(total)))
    }
}

/// Interval statistics of one project.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntervalStats {
    /// Per-kind mean gaps.
    pub means: BucketMeans,
    /// Weighted mean-time sub-score.
    pub weighted_meantime: f64,
}

impl IntervalStats {
    /// Computes interval statistics, using `partition` when the project runs
    /// parallel release lines.
    ///
    /// Timelines with fewer than two events have no gaps at all and score 0.
    pub fn compute(timeline: &Timeline, partition: Option<&ParallelPartition>) -> Self {
        if timeline.len() < 2 {
            return Self::default();
        }

        let buckets = match partition {
            Some(partition) => GapBuckets::parallel(partition),
            None => GapBuckets::linear(timeline),
        };
        let means = buckets.means();

        Self {
            means,
            weighted_meantime: means.weighted_score(),
        }
    }
}
