//! Canonical rejection-reason taxonomy and keyword detection

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Canonical rejection-reason codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    AlcoholIntoxication,
    InvalidLicense,
    FirNotSubmitted,
    PolicyExpired,
    AddonNotCovered,
    UnauthorizedUse,
    NonDisclosure,
    MechanicalFailure,
}

impl ReasonCode {
    /// All codes, in taxonomy order
    pub const ALL: [ReasonCode; 8] = [
        ReasonCode::AlcoholIntoxication,
        ReasonCode::InvalidLicense,
        ReasonCode::FirNotSubmitted,
        ReasonCode::PolicyExpired,
        ReasonCode::AddonNotCovered,
        ReasonCode::UnauthorizedUse,
        ReasonCode::NonDisclosure,
        ReasonCode::MechanicalFailure,
    ];

    /// Keyword phrases whose presence in lower-cased text signals this code.
    ///
    /// Entries are stems matched by substring, so "intoxicat" covers both
    /// "intoxicated" and "intoxication".
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            ReasonCode::AlcoholIntoxication => &["alcohol", "intoxicat", "liquor", "drug"],
            ReasonCode::InvalidLicense => {
                &["invalid license", "no driving licence", "not licensed"]
            }
            ReasonCode::FirNotSubmitted => &["fir", "delay in intimation", "police complaint"],
            ReasonCode::PolicyExpired => &["policy expired", "lapsed policy"],
            ReasonCode::AddonNotCovered => &["addon not purchased", "add-on not covered"],
            ReasonCode::UnauthorizedUse => &["commercial use", "hire or reward"],
            ReasonCode::NonDisclosure => &["non disclosure", "material fact"],
            ReasonCode::MechanicalFailure => &["wear and tear", "mechanical breakdown"],
        }
    }
}

/// Generic context keyword stems used to filter secondary (supporting) clauses.
pub const SUPPORT_CONTEXT_KEYWORDS: [&str; 10] = [
    "driver",
    "licence",
    "license",
    "condition",
    "claim",
    "policy",
    "insured",
    "repudiat",
    "intimation",
    "accident",
];

/// Maps free text to the set of canonical rejection-reason codes it mentions.
///
/// Pure and case-insensitive: a code is included when any of its keyword
/// stems is a substring of the lower-cased input.
pub fn detect_reasons(text: &str) -> BTreeSet<ReasonCode> {
    let text = text.to_lowercase();
    ReasonCode::ALL
        .into_iter()
        .filter(|code| code.keywords().iter().any(|kw| text.contains(kw)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_alcohol_from_stem() {
        let reasons = detect_reasons("Driver was heavily intoxicated at the scene");
        assert!(reasons.contains(&ReasonCode::AlcoholIntoxication));
    }

    #[test]
    fn test_detects_multiple_codes() {
        let reasons =
            detect_reasons("Rejected: driver under influence of liquor and FIR not filed in time");
        assert!(reasons.contains(&ReasonCode::AlcoholIntoxication));
        assert!(reasons.contains(&ReasonCode::FirNotSubmitted));
    }

    #[test]
    fn test_case_insensitive() {
        let reasons = detect_reasons("LAPSED POLICY noticed during scrutiny");
        assert!(reasons.contains(&ReasonCode::PolicyExpired));
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(detect_reasons("minor scratch on the rear bumper").is_empty());
    }

    #[test]
    fn test_serde_screaming_snake() {
        let json = serde_json::to_string(&ReasonCode::AlcoholIntoxication).unwrap();
        assert_eq!(json, "\"ALCOHOL_INTOXICATION\"");
    }
}
