//! Decision engine
//!
//! A pure rule evaluation over survey facts and image findings. No side
//! effects, no I/O, deterministic.

use serde::{Deserialize, Serialize};

use crate::image::{Claimability, ImageFindings};
use crate::survey::SurveyFacts;

/// Final claim verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalDecision {
    Approved,
    Rejected,
    RequiresReview,
    Error,
}

impl FinalDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalDecision::Approved => "APPROVED",
            FinalDecision::Rejected => "REJECTED",
            FinalDecision::RequiresReview => "REQUIRES_REVIEW",
            FinalDecision::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for FinalDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk tier attached to the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level '{other}'")),
        }
    }
}

/// Outcome of rule evaluation: verdict, risk tier, and the ordered list of
/// human-readable reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub final_decision: FinalDecision,
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
}

impl Default for Decision {
    fn default() -> Self {
        Self {
            final_decision: FinalDecision::Approved,
            risk_level: RiskLevel::Low,
            reasons: Vec::new(),
        }
    }
}

/// Combines survey facts and image findings into a final decision.
///
/// Rules run in fixed order. Each firing rule appends its reason and
/// overwrites the verdict and risk tier (last writer wins); reasons only
/// accumulate. Missing or absent fields never fire a rule, so partially
/// populated surveys are always safe to evaluate.
pub fn decide(survey: &SurveyFacts, image: &ImageFindings) -> Decision {
    let mut decision = Decision::default();

    match image.claimability {
        Some(Claimability::NotClaimable) => {
            decision.final_decision = FinalDecision::Rejected;
            decision.risk_level = RiskLevel::High;
            decision.reasons.push(
                image
                    .final_reason
                    .clone()
                    .unwrap_or_else(|| "Damage criteria not met".to_string()),
            );
        }
        Some(Claimability::RequiresReview) => {
            decision.final_decision = FinalDecision::RequiresReview;
            decision.risk_level = RiskLevel::Medium;
            decision
                .reasons
                .push("Image evidence requires manual review".to_string());
        }
        Some(Claimability::Claimable) | None => {}
    }

    if survey.claimable_policy() == Some(false) {
        reject(&mut decision, "Policy expired or invalid");
    }

    if survey.alcohol_intoxicated() == Some(true) {
        reject(&mut decision, "Driver Alcohol Intoxication Detected");
    }

    if survey.driver_license_valid() == Some(false) {
        reject(&mut decision, "Driver license invalid");
    }

    // Legacy compatibility with payloads carrying a precomputed verdict
    if survey.prediction.as_deref() == Some("REJECTED") {
        reject(&mut decision, "Survey risk factors failed");
    }

    if decision.reasons.is_empty() {
        decision.reasons.push("All checks passed".to_string());
    }

    decision
}

fn reject(decision: &mut Decision, reason: &str) {
    decision.final_decision = FinalDecision::Rejected;
    decision.risk_level = RiskLevel::High;
    decision.reasons.push(reason.to_string());
}
