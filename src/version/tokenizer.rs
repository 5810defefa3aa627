//! Dotted version string tokenizing.
//!
//! Version strings are split into a `(major, minor, rest)` triple without any
//! numeric coercion. Components are compared as text everywhere downstream,
//! so `"10"` sorts before `"9"`. Scores stay comparable with earlier runs only
//! as long as that textual ordering is kept.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder used for missing trailing components.
const MISSING_COMPONENT: &str = "0";

/// Structural view of a version string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructuralVersion {
    /// Text before the first dot.
    pub major: String,
    /// Text between the first and second dot, `"0"` when absent.
    pub minor: String,
    /// Everything after the second dot joined back with dots, `"0"` when absent.
    pub rest: String,
}

impl StructuralVersion {
    /// Splits a raw version string into its structural triple.
    ///
    /// Never fails: `""` becomes `("", "0", "0")` and `"1.2.3.4"` becomes
    /// `("1", "2", "3.4")`.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.splitn(3, '.');
        let major = parts.next().unwrap_or_default();
        let minor = parts.next().unwrap_or(MISSING_COMPONENT);
        let rest = parts.next().unwrap_or(MISSING_COMPONENT);

        Self {
            major: major.to_string(),
            minor: minor.to_string(),
            rest: rest.to_string(),
        }
    }
}

impl fmt::Display for StructuralVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.rest)
    }
}

/// Returns the major token of a raw version string.
pub fn major_token(raw: &str) -> &str {
    raw.split('.').next().unwrap_or_default()
}
