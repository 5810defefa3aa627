//! Per-project versioning scorer.
//!
//! Runs the release pipeline once per repository and freezes the result in a
//! [`ProjectVersioningMetrics`] value. Counts, intervals and frequencies are
//! derived from the same timeline; each sub-score is a pure function over
//! its inputs.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::interval::IntervalStats;
use super::normalize::{NormalizedCohort, StatNormalizer};
use super::{finite_or_zero, round2, saturate, ScoringError};
use crate::config::{MissingSummaryPolicy, ScoringConfig};
use crate::data::{ReleaseRecord, RepositorySummary};
use crate::timeline::{
    track_parallel_versions, BranchLayout, ParallelBranchDetector, PrereleaseFilter, Timeline,
};
use crate::version::ReleaseKind;

const DAYS_PER_YEAR: f64 = 365.0;

/// Expected releases per year for each kind, used to normalize frequencies.
const MAJORS_PER_YEAR: f64 = 1.0;
const MINORS_PER_YEAR: f64 = 3.0;
const PATCHES_PER_YEAR: f64 = 18.0;

/// Release counts by kind; `First` events are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseCounts {
    /// Major releases.
    pub major: usize,
    /// Minor releases.
    pub minor: usize,
    /// Patch releases.
    pub patch: usize,
}

impl ReleaseCounts {
    /// Counts the release kinds of a timeline.
    pub fn from_timeline(timeline: &Timeline) -> Self {
        Self {
            major: timeline.count(ReleaseKind::Major),
            minor: timeline.count(ReleaseKind::Minor),
            patch: timeline.count(ReleaseKind::Patch),
        }
    }

    /// `(5 × major + 2 × minor + patch) / 8`.
    pub fn weighted_total(&self) -> f64 {
        (5 * self.major + 2 * self.minor + self.patch) as f64 / 8.0
    }

    /// Weighted count sub-score in `[0, 1)`.
    pub fn weighted_score(&self) -> f64 {
        round2(saturate(self.weighted_total()))
    }
}

/// Age-normalized release rates; `None` when the project age is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frequencies {
    /// Majors per year.
    pub major: Option<f64>,
    /// Minors per third of a year.
    pub minor: Option<f64>,
    /// Patches per eighteenth of a year.
    pub patch: Option<f64>,
}

impl Frequencies {
    /// Computes rates over `age_days`; a missing or non-positive age gives no rates.
    pub fn from_counts(counts: &ReleaseCounts, age_days: Option<f64>) -> Self {
        let Some(age) = age_days.filter(|a| a.is_finite() && *a > 0.0) else {
            return Self::default();
        };

        let rate = |count: usize, per_year: f64| {
            Some(round2(count as f64 / (age / (DAYS_PER_YEAR / per_year))))
        };

        Self {
            major: rate(counts.major, MAJORS_PER_YEAR),
            minor: rate(counts.minor, MINORS_PER_YEAR),
            patch: rate(counts.patch, PATCHES_PER_YEAR),
        }
    }

    /// Weighted frequency sub-score; majors do not contribute.
    pub fn weighted_score(&self) -> f64 {
        match (self.minor, self.patch) {
            (Some(minor), Some(patch)) => finite_or_zero(round2(saturate(minor + patch))),
            _ => 0.0,
        }
    }
}

/// Averages the three sub-scores into a 0-100 score.
///
/// Mean-time and frequency sub-scores of exactly 0 carried no signal and are
/// left out of the denominator; the count sub-score always counts.
pub fn combine_scores(weighted_count: f64, weighted_meantime: f64, weighted_freq: f64) -> f64 {
    let mut n = 3.0;
    if weighted_meantime == 0.0 {
        n -= 1.0;
    }
    if weighted_freq == 0.0 {
        n -= 1.0;
    }
    round2(100.0 * (weighted_count + weighted_meantime + weighted_freq) / n)
}

/// Versioning metrics of one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectVersioningMetrics {
    /// Source repository identifier.
    pub repository_id: u64,
    /// Package-level project identifier.
    pub project_id: Option<u64>,
    /// Package platform.
    pub platform: String,
    /// Number of versions reported by the repository summary.
    pub versions_count: u64,
    /// Latest known update of the repository.
    pub updated_at: Option<DateTime<Utc>>,
    /// Whether parallel release lines were detected.
    pub parallel_lines: bool,
    /// Major releases.
    pub major_count: usize,
    /// Minor releases.
    pub minor_count: usize,
    /// Patch releases.
    pub patch_count: usize,
    /// Weighted count sub-score.
    pub weighted_count: f64,
    /// Mean days before a major release.
    pub major_meantime: Option<f64>,
    /// Mean days before a minor release.
    pub minor_meantime: Option<f64>,
    /// Mean days before a patch release.
    pub patch_meantime: Option<f64>,
    /// Weighted mean-time sub-score.
    pub weighted_meantime: f64,
    /// Major release frequency.
    pub major_freq: Option<f64>,
    /// Minor release frequency.
    pub minor_freq: Option<f64>,
    /// Patch release frequency.
    pub patch_freq: Option<f64>,
    /// Weighted frequency sub-score.
    pub weighted_freq: f64,
    /// Final versioning score, 0-100.
    pub versioning_score: f64,
}

/// Metrics of every scored repository in a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoringRun {
    /// Metrics keyed by repository id.
    pub projects: BTreeMap<u64, ProjectVersioningMetrics>,
    /// Repositories left out because their summary row was missing.
    pub skipped: Vec<u64>,
}

impl ScoringRun {
    /// Computes cross-project z-scores over this run.
    pub fn normalize(&self) -> NormalizedCohort {
        StatNormalizer::normalize(&self.projects)
    }
}

/// Scores release histories.
#[derive(Debug, Clone)]
pub struct VersioningScorer {
    filter: PrereleaseFilter,
    detector: ParallelBranchDetector,
    on_missing_summary: MissingSummaryPolicy,
}

impl Default for VersioningScorer {
    fn default() -> Self {
        Self {
            filter: PrereleaseFilter::default(),
            detector: ParallelBranchDetector::default(),
            on_missing_summary: MissingSummaryPolicy::default(),
        }
    }
}

impl VersioningScorer {
    /// Creates a scorer from configuration.
    pub fn new(config: &ScoringConfig) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(Self {
            filter: PrereleaseFilter::new(config.prerelease_markers.as_slice())?,
            detector: ParallelBranchDetector::new(config.parallel_decrease_threshold),
            on_missing_summary: config.on_missing_summary,
        })
    }

    /// Scores every repository that has release rows.
    ///
    /// Repositories with a summary but no releases are not scored. Release
    /// rows without a matching summary fail the batch or are skipped,
    /// depending on the configured policy.
    pub fn score(
        &self,
        releases: &[ReleaseRecord],
        summaries: &[RepositorySummary],
    ) -> Result<ScoringRun, ScoringError> {
        info!(
            releases = releases.len(),
            repositories = summaries.len(),
            "Scoring release histories"
        );

        let mut by_repository: BTreeMap<u64, Vec<&ReleaseRecord>> = BTreeMap::new();
        for release in releases {
            by_repository
                .entry(release.repository_id)
                .or_default()
                .push(release);
        }

        let summaries: HashMap<u64, &RepositorySummary> =
            summaries.iter().map(|s| (s.repository_id, s)).collect();

        for repository_id in summaries.keys() {
            if !by_repository.contains_key(repository_id) {
                debug!(repository_id, "Repository has no releases, not scored");
            }
        }

        let mut run = ScoringRun::default();
        for (repository_id, rows) in by_repository {
            let Some(summary) = summaries.get(&repository_id) else {
                let err = ScoringError::MissingSummary { repository_id };
                match self.on_missing_summary {
                    MissingSummaryPolicy::Abort => return Err(err),
                    MissingSummaryPolicy::Skip => {
                        warn!("{err}, skipping");
                        run.skipped.push(repository_id);
                        continue;
                    }
                }
            };

            if let Some(metrics) = self.score_project(summary, &rows) {
                run.projects.insert(repository_id, metrics);
            }
        }

        info!(
            scored = run.projects.len(),
            skipped = run.skipped.len(),
            "Scoring completed"
        );
        Ok(run)
    }

    /// Runs the pipeline for one repository.
    ///
    /// Returns `None` when there are no release rows.
    pub fn score_project(
        &self,
        summary: &RepositorySummary,
        rows: &[&ReleaseRecord],
    ) -> Option<ProjectVersioningMetrics> {
        let repository_id = summary.repository_id;
        let timeline = Timeline::build(rows, &self.filter)?;

        let partition = match self.detector.detect(&timeline) {
            BranchLayout::Parallel(majors) => {
                debug!(
                    repository_id,
                    branches = majors.len(),
                    "Parallel release lines detected"
                );
                Some(track_parallel_versions(&timeline, &majors))
            }
            BranchLayout::Linear => None,
        };

        let counts = ReleaseCounts::from_timeline(&timeline);
        let intervals = IntervalStats::compute(&timeline, partition.as_ref());

        let updated_at = rows
            .iter()
            .filter_map(|r| r.updated_at)
            .chain(summary.updated_at)
            .max();
        let age_days = timeline
            .first()
            .and_then(|first| first.published_at)
            .zip(updated_at)
            .map(|(first, last)| (last - first).num_milliseconds() as f64 / 86_400_000.0);
        let freqs = Frequencies::from_counts(&counts, age_days);

        let weighted_count = counts.weighted_score();
        let weighted_meantime = intervals.weighted_meantime;
        let weighted_freq = freqs.weighted_score();
        let versioning_score = combine_scores(weighted_count, weighted_meantime, weighted_freq);

        debug!(
            repository_id,
            events = timeline.len(),
            weighted_count,
            weighted_meantime,
            weighted_freq,
            versioning_score,
            "Project scored"
        );

        Some(ProjectVersioningMetrics {
            repository_id,
            project_id: summary
                .project_id
                .or_else(|| rows.iter().map(|r| r.project_id).max()),
            platform: summary.platform.clone(),
            versions_count: summary.versions_count,
            updated_at,
            parallel_lines: partition.is_some(),
            major_count: counts.major,
            minor_count: counts.minor,
            patch_count: counts.patch,
            weighted_count,
            major_meantime: intervals.means.major,
            minor_meantime: intervals.means.minor,
            patch_meantime: intervals.means.patch,
            weighted_meantime,
            major_freq: freqs.major,
            minor_freq: freqs.minor,
            patch_freq: freqs.patch,
            weighted_freq,
            versioning_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::test_support::{day, release};

    fn summary(repository_id: u64, updated_at: Option<DateTime<Utc>>) -> RepositorySummary {
        RepositorySummary {
            repository_id,
            project_id: None,
            platform: "pypi".to_string(),
            versions_count: 4,
            updated_at,
        }
    }

    fn quarterly_rows(repository_id: u64) -> Vec<ReleaseRecord> {
        vec![
            release(repository_id, "1.0.0", Some(day(2020, 1, 1))),
            release(repository_id, "1.1.0", Some(day(2020, 4, 1))),
            release(repository_id, "1.1.1", Some(day(2020, 7, 1))),
            release(repository_id, "2.0.0", Some(day(2020, 10, 1))),
        ]
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn weighted_count_formula() {
        let counts = ReleaseCounts {
            major: 1,
            minor: 1,
            patch: 1,
        };
        assert_close(counts.weighted_total(), 1.0);
        assert_close(counts.weighted_score(), 0.41);
        assert_close(ReleaseCounts::default().weighted_score(), 0.0);
    }

    #[test]
    fn frequencies_over_a_leap_year() {
        let counts = ReleaseCounts {
            major: 1,
            minor: 1,
            patch: 1,
        };
        let freqs = Frequencies::from_counts(&counts, Some(366.0));
        assert_eq!(freqs.major, Some(1.0));
        assert_eq!(freqs.minor, Some(0.33));
        assert_eq!(freqs.patch, Some(0.06));
        assert_close(freqs.weighted_score(), 0.25);
    }

    #[test]
    fn frequencies_without_age() {
        let counts = ReleaseCounts {
            major: 2,
            minor: 0,
            patch: 5,
        };
        assert_eq!(Frequencies::from_counts(&counts, None), Frequencies::default());
        assert_eq!(
            Frequencies::from_counts(&counts, Some(0.0)),
            Frequencies::default()
        );
        assert_eq!(
            Frequencies::from_counts(&counts, Some(-3.0)),
            Frequencies::default()
        );
        assert_eq!(Frequencies::default().weighted_score(), 0.0);
    }

    #[test]
    fn combine_drops_silent_components_from_denominator() {
        assert_close(combine_scores(0.41, 0.11, 0.25), 25.67);
        assert_close(combine_scores(0.4, 0.0, 0.2), 30.0);
        assert_close(combine_scores(0.4, 0.0, 0.0), 40.0);
        assert_close(combine_scores(0.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn quarterly_project_end_to_end() {
        let rows = quarterly_rows(1);
        let refs: Vec<&ReleaseRecord> = rows.iter().collect();
        let metrics = VersioningScorer::default()
            .score_project(&summary(1, Some(day(2021, 1, 1))), &refs)
            .unwrap();

        assert!(!metrics.parallel_lines);
        assert_eq!(
            (metrics.major_count, metrics.minor_count, metrics.patch_count),
            (1, 1, 1)
        );
        assert_close(metrics.weighted_count, 0.41);
        assert_eq!(metrics.major_meantime, Some(92.0));
        assert_eq!(metrics.minor_meantime, Some(91.0));
        assert_eq!(metrics.patch_meantime, Some(91.0));
        assert_close(metrics.weighted_meantime, 0.11);
        assert_eq!(metrics.minor_freq, Some(0.33));
        assert_close(metrics.weighted_freq, 0.25);
        assert_close(metrics.versioning_score, 25.67);
        assert_eq!(metrics.project_id, Some(10));
    }

    #[test]
    fn single_release_project() {
        let rows = vec![release(5, "1.0.0", Some(day(2020, 1, 1)))];
        let refs: Vec<&ReleaseRecord> = rows.iter().collect();
        let metrics = VersioningScorer::default()
            .score_project(&summary(5, Some(day(2020, 12, 31))), &refs)
            .unwrap();

        assert_eq!(metrics.weighted_meantime, 0.0);
        assert_eq!(metrics.major_meantime, None);
        assert_eq!(metrics.weighted_count, 0.0);
        assert_eq!(metrics.weighted_freq, 0.0);
        assert_eq!(metrics.versioning_score, 0.0);
    }

    #[test]
    fn updated_at_takes_latest_of_rows_and_summary() {
        let mut rows = quarterly_rows(1);
        rows[0].updated_at = Some(day(2022, 1, 1));
        let refs: Vec<&ReleaseRecord> = rows.iter().collect();
        let metrics = VersioningScorer::default()
            .score_project(&summary(1, Some(day(2021, 1, 1))), &refs)
            .unwrap();
        assert_eq!(metrics.updated_at, Some(day(2022, 1, 1)));
    }

    #[test]
    fn dev_only_project_is_scored_unfiltered() {
        let rows = vec![
            release(9, "0.1.dev1", Some(day(2020, 1, 1))),
            release(9, "0.1.dev2", Some(day(2020, 2, 1))),
            release(9, "0.2.dev1", Some(day(2020, 3, 1))),
        ];
        let run = VersioningScorer::default()
            .score(&rows, &[summary(9, Some(day(2020, 6, 1)))])
            .unwrap();

        let metrics = &run.projects[&9];
        assert_eq!(metrics.minor_count, 1);
        assert_eq!(metrics.patch_count, 1);
        assert!(metrics.weighted_count > 0.0);
    }

    #[test]
    fn parallel_project_uses_partition() {
        let versions = ["2.0.1", "1.0.1", "3.0.2", "2.0.3", "3.0.4", "1.0.5"];
        let rows: Vec<ReleaseRecord> = versions
            .iter()
            .enumerate()
            .map(|(i, v)| release(3, v, Some(day(2020, 1 + i as u32, 1))))
            .collect();
        let run = VersioningScorer::default()
            .score(&rows, &[summary(3, Some(day(2021, 1, 1)))])
            .unwrap();

        let metrics = &run.projects[&3];
        assert!(metrics.parallel_lines);
        // Branch starts: 1.0.1 Feb 1, 2.0.1 Jan 1, 3.0.2 Mar 1.
        // Major gaps: Feb 1 -> Jan 1 (-31), Jan 1 -> Mar 1 (60).
        assert_eq!(metrics.major_meantime, Some(14.5));
        assert!(metrics.versioning_score > 0.0);
    }

    #[test]
    fn missing_summary_aborts_by_default() {
        let rows = quarterly_rows(2);
        let result = VersioningScorer::default().score(&rows, &[]);
        assert!(matches!(
            result,
            Err(ScoringError::MissingSummary { repository_id: 2 })
        ));
    }

    #[test]
    fn missing_summary_can_be_skipped() {
        let config = ScoringConfig {
            on_missing_summary: MissingSummaryPolicy::Skip,
            ..ScoringConfig::default()
        };
        let mut rows = quarterly_rows(2);
        rows.extend(quarterly_rows(4));

        let run = VersioningScorer::new(&config)
            .unwrap()
            .score(&rows, &[summary(4, Some(day(2021, 1, 1)))])
            .unwrap();

        assert_eq!(run.skipped, vec![2]);
        assert_eq!(run.projects.keys().copied().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn repositories_without_releases_are_not_scored() {
        let rows = quarterly_rows(1);
        let run = VersioningScorer::default()
            .score(&rows, &[summary(1, None), summary(8, None)])
            .unwrap();
        assert!(run.projects.contains_key(&1));
        assert!(!run.projects.contains_key(&8));
    }
}
