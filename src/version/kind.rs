//! Release kind classification.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::StructuralVersion;

/// Kind of a release relative to its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseKind {
    /// Major component changed.
    Major,
    /// Minor component changed.
    Minor,
    /// Only the trailing component changed.
    Patch,
    /// No predecessor, or a version structurally equal to its predecessor.
    First,
}

impl ReleaseKind {
    /// Classifies the transition from `prev` to `curr`.
    ///
    /// Components are compared with string inequality only, so this says
    /// nothing about whether `curr` is newer than `prev`.
    pub fn classify(prev: &StructuralVersion, curr: &StructuralVersion) -> Self {
        if prev.major != curr.major {
            Self::Major
        } else if prev.minor != curr.minor {
            Self::Minor
        } else if prev.rest != curr.rest {
            Self::Patch
        } else {
            Self::First
        }
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "MAJOR"),
            Self::Minor => write!(f, "MINOR"),
            Self::Patch => write!(f, "PATCH"),
            Self::First => write!(f, "FIRST"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(prev: &str, curr: &str) -> ReleaseKind {
        ReleaseKind::classify(
            &StructuralVersion::parse(prev),
            &StructuralVersion::parse(curr),
        )
    }

    #[test]
    fn major_wins_over_lower_slots() {
        assert_eq!(classify("1.4.2", "2.0.0"), ReleaseKind::Major);
        assert_eq!(classify("2.0.0", "1.9.9"), ReleaseKind::Major);
    }

    #[test]
    fn minor_and_patch() {
        assert_eq!(classify("1.4.2", "1.5.0"), ReleaseKind::Minor);
        assert_eq!(classify("1.4.2", "1.4.3"), ReleaseKind::Patch);
        assert_eq!(classify("1.4", "1.4.0.1"), ReleaseKind::Patch);
    }

    #[test]
    fn padded_forms_are_equal() {
        assert_eq!(classify("1", "1.0.0"), ReleaseKind::First);
    }

    #[test]
    fn width_mismatch_is_still_a_change() {
        // "9" and "09" differ as text even though they are the same number.
        assert_eq!(classify("1.9", "1.09"), ReleaseKind::Minor);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn same_version_is_first(s in "[0-9a-z.]{0,20}") {
                prop_assert_eq!(classify(&s, &s), ReleaseKind::First);
            }

            #[test]
            fn differing_major_is_major(
                a in "[0-9]{1,2}",
                b in "[0-9]{1,2}",
                tail in "[0-9.]{0,6}",
            ) {
                prop_assume!(a != b);
                let kind = classify(&format!("{a}.{tail}"), &format!("{b}.{tail}"));
                prop_assert_eq!(kind, ReleaseKind::Major);
            }
        }
    }
}
