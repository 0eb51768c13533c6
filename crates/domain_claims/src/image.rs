//! Image-derived damage findings

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Aggregate damage severity across all analyzed images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    #[default]
    #[serde(alias = "none")]
    None,
    Minor,
    Major,
}

/// How much visual evidence backs the findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvidenceStrength {
    #[default]
    None,
    Weak,
    Medium,
    Strong,
}

/// The image model's claimability verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Claimability {
    Claimable,
    #[serde(rename = "Not Claimable", alias = "Non-Claimable")]
    NotClaimable,
    #[serde(rename = "Requires Review")]
    RequiresReview,
}

/// Structured findings produced once per claim by the image collaborator.
///
/// Immutable after production. `claimability` is absent when no images were
/// analyzed or the analysis was inconclusive; absent never fires a decision
/// rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageFindings {
    pub damage_detected: bool,
    pub severity: Severity,
    pub confidence: f32,
    pub evidence_strength: EvidenceStrength,
    pub damage_types: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimability: Option<Claimability>,
    /// The model's stated justification for its claimability verdict
    #[serde(
        skip_serializing_if = "Option::is_none",
        alias = "final_insurance_reason"
    )]
    pub final_reason: Option<String>,
    pub reasoning: Vec<String>,
    #[serde(alias = "annotated_images")]
    pub annotated_image_refs: Vec<String>,
}

impl ImageFindings {
    /// Neutral "no damage detected, inconclusive" finding used when image
    /// analysis fails.
    pub fn inconclusive(note: impl Into<String>) -> Self {
        Self {
            reasoning: vec![note.into()],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_claimability_wire_names() {
        let findings: ImageFindings = serde_json::from_value(json!({
            "damage_detected": true,
            "severity": "MAJOR",
            "claimability": "Not Claimable"
        }))
        .unwrap();
        assert_eq!(findings.claimability, Some(Claimability::NotClaimable));
        assert_eq!(findings.severity, Severity::Major);
    }

    #[test]
    fn test_legacy_field_aliases() {
        let findings: ImageFindings = serde_json::from_value(json!({
            "severity": "none",
            "claimability": "Non-Claimable",
            "final_insurance_reason": "Only small scratches/dents detected",
            "annotated_images": ["uploads/annotated/a.jpg"]
        }))
        .unwrap();
        assert_eq!(findings.severity, Severity::None);
        assert_eq!(findings.claimability, Some(Claimability::NotClaimable));
        assert_eq!(
            findings.final_reason.as_deref(),
            Some("Only small scratches/dents detected")
        );
        assert_eq!(findings.annotated_image_refs.len(), 1);
    }

    #[test]
    fn test_inconclusive_has_no_claimability() {
        let findings = ImageFindings::inconclusive("Image analysis unavailable");
        assert!(findings.claimability.is_none());
        assert!(!findings.damage_detected);
        assert_eq!(findings.reasoning, vec!["Image analysis unavailable"]);
    }
}
