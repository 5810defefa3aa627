//! Serialized output shapes: the metrics table and per-repository score records.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::scoring::{Metric, NormalizedCohort, NormalizedProject, ProjectVersioningMetrics};

/// Metrics reported as subcomponents of the score record, in output order.
const SUBCOMPONENTS: &[Metric] = &[
    Metric::MajorCount,
    Metric::MinorCount,
    Metric::PatchCount,
    Metric::MajorMeantime,
    Metric::MinorMeantime,
    Metric::PatchMeantime,
    Metric::MinorFreq,
    Metric::PatchFreq,
];

/// A number in a score record; undefined values are written as `"NaN"`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReportValue(pub Option<f64>);

impl Serialize for ReportValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.filter(|v| v.is_finite()) {
            Some(v) => serializer.serialize_f64(v),
            None => serializer.serialize_str("NaN"),
        }
    }
}

impl<'de> Deserialize<'de> for ReportValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(v) => Ok(Self(Some(v))),
            Raw::Text(s) if s.eq_ignore_ascii_case("nan") => Ok(Self(None)),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "expected a number or \"NaN\", got {s:?}"
            ))),
        }
    }
}

/// Headline score of the component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    /// Versioning score.
    pub score: ReportValue,
    /// Cross-project z-score of the versioning score.
    #[serde(rename = "z-score")]
    pub zscore: ReportValue,
}

/// One contributing metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubcomponentScore {
    /// Metric column name.
    pub column: String,
    /// Raw value.
    pub actual_value: ReportValue,
    /// Cross-project z-score; absent for columns that are not normalized.
    #[serde(rename = "z-score", default, skip_serializing_if = "Option::is_none")]
    pub zscore: Option<ReportValue>,
}

/// Score record shared with sibling scoring components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Headline score.
    pub component_score: ComponentScore,
    /// Contributing metrics.
    pub subcomponents_score: Vec<SubcomponentScore>,
}

impl ScoreRecord {
    /// Builds the record of one normalized project.
    pub fn from_project(project: &NormalizedProject) -> Self {
        let metrics = &project.metrics;
        let zscores = &project.zscores;

        let mut subcomponents_score = vec![SubcomponentScore {
            column: "versions_count".to_string(),
            actual_value: ReportValue(Some(metrics.versions_count as f64)),
            zscore: None,
        }];
        subcomponents_score.extend(SUBCOMPONENTS.iter().map(|metric| SubcomponentScore {
            column: metric.name().to_string(),
            actual_value: ReportValue(metric.value(metrics)),
            zscore: Some(ReportValue(zscores.get(*metric))),
        }));

        Self {
            component_score: ComponentScore {
                score: ReportValue(Some(metrics.versioning_score)),
                zscore: ReportValue(zscores.get(Metric::VersioningScore)),
            },
            subcomponents_score,
        }
    }
}

/// One row of the metrics table: every metric plus its `_zscore` column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRow {
    /// Raw metrics.
    #[serde(flatten)]
    pub metrics: ProjectVersioningMetrics,
    /// Z-score columns; `null` when undefined.
    #[serde(flatten)]
    pub zscores: BTreeMap<String, Option<f64>>,
}

/// Metrics table of a cohort, ordered by repository id.
pub fn metrics_table(cohort: &NormalizedCohort) -> Vec<MetricsRow> {
    cohort
        .projects
        .values()
        .map(|project| MetricsRow {
            metrics: project.metrics.clone(),
            zscores: project.zscores.columns(),
        })
        .collect()
}

/// Score records of a cohort, keyed by repository id.
pub fn score_records(cohort: &NormalizedCohort) -> BTreeMap<u64, ScoreRecord> {
    cohort
        .projects
        .iter()
        .map(|(id, project)| (*id, ScoreRecord::from_project(project)))
        .collect()
}
