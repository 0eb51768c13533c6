//! Collaborator ports for the claims pipeline
//!
//! The image model, keyword extraction, tabular prediction, explanation
//! generation, and persistence are all external collaborators. Each is
//! reached through one of these traits; adapter crates implement them, and
//! tests substitute mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DomainPort, PortError, UserId};
use domain_retrieval::ClauseRecord;

use crate::claim::Claim;
use crate::decision::Decision;
use crate::image::ImageFindings;
use crate::survey::{SectionMap, SurveyFacts};

/// Fixed text returned when explanation generation is unavailable
pub const FALLBACK_EXPLANATION: &str = "Explanation unavailable at this time.";

/// Structured output of LLM keyword extraction over the claim description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordExtraction {
    pub incident_type: String,
    pub damage_severity: String,
    pub keywords: Vec<String>,
}

impl Default for KeywordExtraction {
    fn default() -> Self {
        Self {
            incident_type: "unknown".to_string(),
            damage_severity: "unknown".to_string(),
            keywords: Vec::new(),
        }
    }
}

/// Tabular-model response: a scored verdict, or a structured report of the
/// fields the model is missing (an input failure, not an error).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PredictionOutcome {
    Scored {
        prediction: String,
        probability: f64,
    },
    MissingFields {
        required: Vec<String>,
        missing: Vec<String>,
    },
}

/// Runs damage detection/classification over uploaded images
#[async_trait]
pub trait ImageAnalyzer: DomainPort {
    async fn analyze(&self, image_refs: &[String]) -> Result<ImageFindings, PortError>;
}

/// Extracts structured keywords from the free-text claim description
#[async_trait]
pub trait KeywordExtractor: DomainPort {
    async fn extract(&self, description: &str) -> Result<KeywordExtraction, PortError>;
}

/// Scores the flattened survey features
#[async_trait]
pub trait TabularPredictor: DomainPort {
    async fn predict(&self, features: &SectionMap) -> Result<PredictionOutcome, PortError>;
}

/// Everything the explanation prompt is built from
#[derive(Debug, Clone, Copy)]
pub struct ExplanationRequest<'a> {
    pub insurer: &'a str,
    pub policy_category: &'a str,
    pub reasons: &'a [String],
    pub clauses: &'a [ClauseRecord],
    pub image_findings: Option<&'a ImageFindings>,
}

/// Renders the decision into structured prose.
///
/// Implementations degrade to [`FALLBACK_EXPLANATION`] on collaborator
/// failure; the pipeline applies the same fallback if the port itself errs.
#[async_trait]
pub trait ExplanationGenerator: DomainPort {
    async fn explain(&self, request: ExplanationRequest<'_>) -> Result<String, PortError>;
}

/// Survey payload as persisted alongside a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub payload: SurveyFacts,
    pub prediction: Option<String>,
    pub probability: Option<f64>,
}

/// One uploaded image with its findings blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub filename: String,
    pub findings: ImageFindings,
}

/// Keywords, clauses, and prose persisted for a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRecord {
    pub extracted_keywords: KeywordExtraction,
    pub clauses_used: Vec<ClauseRecord>,
    pub explanation_text: String,
}

/// Everything written in the final atomic persistence step
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimArtifacts {
    pub decision: Decision,
    pub survey: SurveyRecord,
    pub images: Vec<ImageRecord>,
    pub explanation: ExplanationRecord,
}

/// Filter for claim listings
#[derive(Debug, Clone, Default)]
pub struct ClaimFilter {
    pub insurer: Option<String>,
    pub user_id: Option<UserId>,
    pub limit: Option<i64>,
}

/// Persistence port for the claim aggregate and its owned records.
///
/// `finalize` must be atomic: either the claim update and all survey,
/// image, and explanation appends commit, or none do.
#[async_trait]
pub trait ClaimStore: DomainPort {
    /// Durable checkpoint: inserts the claim row in `PROCESSING` state
    async fn create_processing(&self, claim: &Claim) -> Result<(), PortError>;

    /// Atomically persists the decision and all owned records
    async fn finalize(&self, claim_id: ClaimId, artifacts: &ClaimArtifacts)
        -> Result<(), PortError>;

    /// Marks the claim `ERROR` after a failed finalize
    async fn mark_error(&self, claim_id: ClaimId) -> Result<(), PortError>;

    async fn get(&self, claim_id: ClaimId) -> Result<Claim, PortError>;

    async fn list(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, PortError>;

    /// Most recently appended survey record, if any
    async fn latest_survey(&self, claim_id: ClaimId) -> Result<Option<SurveyRecord>, PortError>;

    /// Most recently appended explanation record, if any
    async fn latest_explanation(
        &self,
        claim_id: ClaimId,
    ) -> Result<Option<ExplanationRecord>, PortError>;
}
