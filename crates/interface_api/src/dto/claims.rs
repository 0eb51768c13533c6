//! Claims DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, UserId};
use domain_claims::{
    Claim, ClaimOutcome, ClaimState, ExplanationRecord, FinalDecision, ImageFindings,
    KeywordExtraction, RiskLevel,
};
use domain_retrieval::ClauseRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitClaimRequest {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub insurer: String,
    pub policy_category: String,
    pub description: String,
    /// Nested survey payload; an unparseable payload is treated as empty
    #[serde(default)]
    pub survey: serde_json::Value,
    /// Opaque references to already-uploaded images
    #[serde(default)]
    pub image_refs: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListClaimsQuery {
    pub insurer: Option<String>,
    pub user_id: Option<UserId>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimDecisionResponse {
    pub claim_id: ClaimId,
    pub status: String,
    pub final_decision: FinalDecision,
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
    pub extracted_keywords: KeywordExtraction,
    pub clauses_used: Vec<ClauseRecord>,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_findings: Option<ImageFindings>,
}

impl From<ClaimOutcome> for ClaimDecisionResponse {
    fn from(outcome: ClaimOutcome) -> Self {
        Self {
            claim_id: outcome.claim_id,
            status: outcome.decision.final_decision.to_string(),
            final_decision: outcome.decision.final_decision,
            risk_level: outcome.decision.risk_level,
            reasons: outcome.decision.reasons,
            extracted_keywords: outcome.keywords,
            clauses_used: outcome.clauses_used,
            explanation: outcome.explanation,
            image_findings: outcome.image_findings,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSummaryResponse {
    pub claim_id: ClaimId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub insurer: String,
    pub policy_category: String,
    pub description: String,
    pub status: ClaimState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ClaimSummaryResponse {
    /// Builds the summary from the claim row and, when requested, its most
    /// recent explanation.
    pub fn from_parts(claim: Claim, explanation: Option<ExplanationRecord>) -> Self {
        Self {
            claim_id: claim.id,
            user_id: claim.user_id,
            insurer: claim.insurer,
            policy_category: claim.policy_category,
            description: claim.description,
            status: claim.state,
            risk_level: claim.risk_level,
            created_at: claim.created_at,
            explanation: explanation.map(|record| record.explanation_text),
        }
    }
}
