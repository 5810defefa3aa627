//! Cross-project z-score normalization.
//!
//! Z-scores are cross-sectional: adding or removing a single project moves
//! every other project's z-scores, so they are always recomputed over the
//! whole cohort of a batch.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::round2;
use super::scorer::ProjectVersioningMetrics;

/// Derived metric columns that receive a z-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Major release count.
    MajorCount,
    /// Minor release count.
    MinorCount,
    /// Patch release count.
    PatchCount,
    /// Weighted count sub-score.
    WeightedCount,
    /// Mean days before a major release.
    MajorMeantime,
    /// Mean days before a minor release.
    MinorMeantime,
    /// Mean days before a patch release.
    PatchMeantime,
    /// Weighted mean-time sub-score.
    WeightedMeantime,
    /// Major release frequency.
    MajorFreq,
    /// Minor release frequency.
    MinorFreq,
    /// Patch release frequency.
    PatchFreq,
    /// Weighted frequency sub-score.
    WeightedFreq,
    /// Final versioning score.
    VersioningScore,
}

impl Metric {
    /// Every metric, in table column order.
    pub fn all() -> &'static [Self] {
        &[
            Self::MajorCount,
            Self::MinorCount,
            Self::PatchCount,
            Self::WeightedCount,
            Self::MajorMeantime,
            Self::MinorMeantime,
            Self::PatchMeantime,
            Self::WeightedMeantime,
            Self::MajorFreq,
            Self::MinorFreq,
            Self::PatchFreq,
            Self::WeightedFreq,
            Self::VersioningScore,
        ]
    }

    /// Column name in the metrics table.
    pub fn name(self) -> &'static str {
        match self {
            Self::MajorCount => "major_count",
            Self::MinorCount => "minor_count",
            Self::PatchCount => "patch_count",
            Self::WeightedCount => "weighted_count",
            Self::MajorMeantime => "major_meantime",
            Self::MinorMeantime => "minor_meantime",
            Self::PatchMeantime => "patch_meantime",
            Self::WeightedMeantime => "weighted_meantime",
            Self::MajorFreq => "major_freq",
            Self::MinorFreq => "minor_freq",
            Self::PatchFreq => "patch_freq",
            Self::WeightedFreq => "weighted_freq",
            Self::VersioningScore => "versioning_score",
        }
    }

    /// Name of the matching z-score column.
    pub fn zscore_column(self) -> String {
        format!("{}_zscore", self.name())
    }

    /// Reads this metric from a project's metrics; `None` when undefined.
    pub fn value(self, m: &ProjectVersioningMetrics) -> Option<f64> {
        match self {
            Self::MajorCount => Some(m.major_count as f64),
            Self::MinorCount => Some(m.minor_count as f64),
            Self::PatchCount => Some(m.patch_count as f64),
            Self::WeightedCount => Some(m.weighted_count),
            Self::MajorMeantime => m.major_meantime,
            Self::MinorMeantime => m.minor_meantime,
            Self::PatchMeantime => m.patch_meantime,
            Self::WeightedMeantime => Some(m.weighted_meantime),
            Self::MajorFreq => m.major_freq,
            Self::MinorFreq => m.minor_freq,
            Self::PatchFreq => m.patch_freq,
            Self::WeightedFreq => Some(m.weighted_freq),
            Self::VersioningScore => Some(m.versioning_score),
        }
        .filter(|v| v.is_finite())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Defined z-scores of one project; absent metrics are undefined.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZScores(BTreeMap<Metric, f64>);

impl ZScores {
    /// Z-score of `metric`, if defined.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.0.get(&metric).copied()
    }

    /// Every metric with its z-score, undefined ones included.
    pub fn columns(&self) -> BTreeMap<String, Option<f64>> {
        Metric::all()
            .iter()
            .map(|m| (m.zscore_column(), self.get(*m)))
            .collect()
    }
}

/// A scored project with its z-scores.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedProject {
    /// Raw metrics.
    pub metrics: ProjectVersioningMetrics,
    /// Cross-project z-scores.
    pub zscores: ZScores,
}

/// Scored projects of a batch, keyed by repository id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedCohort {
    /// Projects keyed by repository id.
    pub projects: BTreeMap<u64, NormalizedProject>,
}

/// Computes population z-scores across a cohort.
pub struct StatNormalizer;

impl StatNormalizer {
    /// Normalizes every metric column over `projects`.
    pub fn normalize(projects: &BTreeMap<u64, ProjectVersioningMetrics>) -> NormalizedCohort {
        let mut zscores: BTreeMap<u64, ZScores> = projects
            .keys()
            .map(|id| (*id, ZScores::default()))
            .collect();

        for metric in Metric::all() {
            let column: Vec<Option<f64>> = projects.values().map(|m| metric.value(m)).collect();
            let scores = Self::zscores(&column);

            for (id, score) in projects.keys().zip(scores) {
                if let (Some(score), Some(entry)) = (score, zscores.get_mut(id)) {
                    entry.0.insert(*metric, score);
                }
            }
        }

        NormalizedCohort {
            projects: projects
                .iter()
                .map(|(id, metrics)| {
                    (
                        *id,
                        NormalizedProject {
                            metrics: metrics.clone(),
                            zscores: zscores.remove(id).unwrap_or_default(),
                        },
                    )
                })
                .collect(),
        }
    }

    /// Population z-scores (ddof = 0) of one column, rounded to 2 decimals.
    ///
    /// Undefined inputs stay undefined and are left out of the mean and
    /// standard deviation. A column without spread has no z-scores.
    pub fn zscores(column: &[Option<f64>]) -> Vec<Option<f64>> {
        let known: Vec<f64> = column.iter().flatten().copied().collect();
        if known.is_empty() {
            return vec![None; column.len()];
        }

        let n = known.len() as f64;
        let mean = known.iter().sum::<f64>() / n;
        let variance = known.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let stddev = variance.sqrt();

        if !stddev.is_finite() || stddev <= f64::EPSILON * mean.abs().max(1.0) {
            return vec![None; column.len()];
        }

        column
            .iter()
            .map(|v| v.map(|v| round2((v - mean) / stddev)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(repository_id: u64, score: f64, major_meantime: Option<f64>) -> ProjectVersioningMetrics {
        ProjectVersioningMetrics {
            repository_id,
            project_id: None,
            platform: "npm".to_string(),
            versions_count: 1,
            updated_at: None,
            parallel_lines: false,
            major_count: repository_id as usize,
            minor_count: 0,
            patch_count: 0,
            weighted_count: 0.0,
            major_meantime,
            minor_meantime: None,
            patch_meantime: None,
            weighted_meantime: 0.0,
            major_freq: None,
            minor_freq: None,
            patch_freq: None,
            weighted_freq: 0.0,
            versioning_score: score,
        }
    }

    fn cohort(entries: Vec<ProjectVersioningMetrics>) -> BTreeMap<u64, ProjectVersioningMetrics> {
        entries.into_iter().map(|m| (m.repository_id, m)).collect()
    }

    #[test]
    fn population_zscores() {
        let scores = StatNormalizer::zscores(&[Some(1.0), Some(2.0), Some(3.0)]);
        // stddev = sqrt(2/3)
        assert_eq!(scores, vec![Some(-1.22), Some(0.0), Some(1.22)]);
    }

    #[test]
    fn undefined_entries_are_omitted() {
        let scores = StatNormalizer::zscores(&[Some(2.0), None, Some(4.0)]);
        assert_eq!(scores, vec![Some(-1.0), None, Some(1.0)]);
    }

    #[test]
    fn degenerate_columns_are_undefined() {
        assert_eq!(StatNormalizer::zscores(&[Some(5.0)]), vec![None]);
        assert_eq!(
            StatNormalizer::zscores(&[Some(0.1), Some(0.1), None]),
            vec![None, None, None]
        );
        assert_eq!(StatNormalizer::zscores(&[None, None]), vec![None, None]);
        assert!(StatNormalizer::zscores(&[]).is_empty());
    }

    #[test]
    fn normalizes_every_column() {
        let projects = cohort(vec![
            metrics(1, 20.0, Some(100.0)),
            metrics(2, 40.0, None),
            metrics(3, 60.0, Some(300.0)),
        ]);
        let normalized = StatNormalizer::normalize(&projects);

        let first = &normalized.projects[&1].zscores;
        assert_eq!(first.get(Metric::VersioningScore), Some(-1.22));
        assert_eq!(first.get(Metric::MajorCount), Some(-1.22));
        assert_eq!(first.get(Metric::MajorMeantime), Some(-1.0));
        // All-zero column.
        assert_eq!(first.get(Metric::WeightedCount), None);

        let second = &normalized.projects[&2].zscores;
        assert_eq!(second.get(Metric::MajorMeantime), None);
        assert_eq!(second.get(Metric::VersioningScore), Some(0.0));
    }

    #[test]
    fn membership_changes_every_zscore() {
        let mut projects = cohort(vec![
            metrics(1, 20.0, None),
            metrics(2, 40.0, None),
            metrics(3, 60.0, None),
        ]);
        let before = StatNormalizer::normalize(&projects);
        projects.insert(4, metrics(4, 90.0, None));
        let after = StatNormalizer::normalize(&projects);

        for id in [1, 2, 3] {
            assert_ne!(
                before.projects[&id].zscores.get(Metric::VersioningScore),
                after.projects[&id].zscores.get(Metric::VersioningScore)
            );
        }
    }

    #[test]
    fn normalization_is_deterministic() {
        let projects = cohort(vec![
            metrics(1, 12.5, Some(3.0)),
            metrics(2, 47.0, Some(9.0)),
            metrics(5, 33.3, None),
        ]);
        assert_eq!(
            StatNormalizer::normalize(&projects),
            StatNormalizer::normalize(&projects)
        );
    }

    #[test]
    fn zscore_columns_cover_every_metric() {
        let columns = ZScores::default().columns();
        assert_eq!(columns.len(), Metric::all().len());
        assert_eq!(columns.get("versioning_score_zscore"), Some(&None));
    }
}
