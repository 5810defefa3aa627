//! Versioning health scoring.
//!
//! # Scoring Formula
//!
//! ```text
//! weighted_count    = saturate((5 × majors + 2 × minors + patches) / 8)
//! weighted_meantime = saturate(6 / mean_major + 4 / mean_minor + 2 / mean_patch)
//! weighted_freq     = saturate(minor_freq + patch_freq)
//!
//! versioning_score  = 100 × (weighted_count + weighted_meantime + weighted_freq) / n
//!
//! Where:
//!   saturate(x) = ln(1 + x) / (1 + ln(1 + x))      bounded to [0, 1)
//!   n = 3, minus one for each of weighted_meantime and weighted_freq that is 0
//! ```
//!
//! Buckets without a defined mean drop out of the mean-time sum. Every
//! sub-score and the final score are rounded to two decimals.

mod error;
pub mod interval;
pub mod normalize;
pub mod scorer;

pub use error::ScoringError;
pub use interval::{BucketMeans, GapBuckets, IntervalStats};
pub use normalize::{Metric, NormalizedCohort, NormalizedProject, StatNormalizer, ZScores};
pub use scorer::{
    combine_scores, Frequencies, ProjectVersioningMetrics, ReleaseCounts, ScoringRun,
    VersioningScorer,
};

/// Log-scales a non-negative value and squeezes it into `[0, 1)`.
pub fn saturate(x: f64) -> f64 {
    let scaled = x.ln_1p();
    scaled / (1.0 + scaled)
}

/// Rounds to two decimals, half away from zero.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Treats NaN and infinities as "no signal".
fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturate_is_bounded() {
        assert_eq!(saturate(0.0), 0.0);
        assert!((saturate(1.0) - 0.409_39).abs() < 1e-5);
        assert!(saturate(1e12) < 1.0);
    }

    #[test]
    fn round2_half_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(-1.234), -1.23);
    }

    #[test]
    fn non_finite_is_zero() {
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(0.5), 0.5);
    }
}
