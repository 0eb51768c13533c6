//! Mock collaborators
//!
//! Port implementations with canned results or forced failures, plus an
//! in-memory claim store for pipeline and API tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use core_kernel::{ClaimId, DomainPort, PortError};
use domain_claims::{
    Claim, ClaimArtifacts, ClaimFilter, ClaimState, ClaimStore, ExplanationGenerator,
    ExplanationRecord, ExplanationRequest, ImageAnalyzer, ImageFindings, KeywordExtraction,
    KeywordExtractor, PredictionOutcome, SectionMap, SurveyRecord, TabularPredictor,
};

/// Image analyzer returning fixed findings, or failing on demand
pub struct MockImageAnalyzer {
    findings: ImageFindings,
    fail: bool,
}

impl MockImageAnalyzer {
    pub fn returning(findings: ImageFindings) -> Self {
        Self {
            findings,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            findings: ImageFindings::default(),
            fail: true,
        }
    }
}

impl DomainPort for MockImageAnalyzer {}

#[async_trait]
impl ImageAnalyzer for MockImageAnalyzer {
    async fn analyze(&self, _image_refs: &[String]) -> Result<ImageFindings, PortError> {
        if self.fail {
            return Err(PortError::connection("image model offline"));
        }
        Ok(self.findings.clone())
    }
}

/// Keyword extractor returning a fixed extraction, or failing on demand
pub struct MockKeywordExtractor {
    extraction: KeywordExtraction,
    fail: bool,
}

impl MockKeywordExtractor {
    pub fn returning(keywords: &[&str]) -> Self {
        Self {
            extraction: KeywordExtraction {
                incident_type: "collision".to_string(),
                damage_severity: "moderate".to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            },
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            extraction: KeywordExtraction::default(),
            fail: true,
        }
    }
}

impl DomainPort for MockKeywordExtractor {}

#[async_trait]
impl KeywordExtractor for MockKeywordExtractor {
    async fn extract(&self, _description: &str) -> Result<KeywordExtraction, PortError> {
        if self.fail {
            return Err(PortError::timeout("extract_keywords", 120_000));
        }
        Ok(self.extraction.clone())
    }
}

/// Tabular predictor with a fixed outcome, or failing on demand
pub struct MockTabularPredictor {
    outcome: Option<PredictionOutcome>,
}

impl MockTabularPredictor {
    pub fn scored(prediction: &str, probability: f64) -> Self {
        Self {
            outcome: Some(PredictionOutcome::Scored {
                prediction: prediction.to_string(),
                probability,
            }),
        }
    }

    pub fn missing_fields(required: &[&str], missing: &[&str]) -> Self {
        Self {
            outcome: Some(PredictionOutcome::MissingFields {
                required: required.iter().map(|f| f.to_string()).collect(),
                missing: missing.iter().map(|f| f.to_string()).collect(),
            }),
        }
    }

    pub fn failing() -> Self {
        Self { outcome: None }
    }
}

impl DomainPort for MockTabularPredictor {}

#[async_trait]
impl TabularPredictor for MockTabularPredictor {
    async fn predict(&self, _features: &SectionMap) -> Result<PredictionOutcome, PortError> {
        self.outcome
            .clone()
            .ok_or_else(|| PortError::connection("tabular model offline"))
    }
}

/// Explanation generator echoing its inputs, or failing on demand
pub struct MockExplanationGenerator {
    fail: bool,
}

impl MockExplanationGenerator {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl Default for MockExplanationGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainPort for MockExplanationGenerator {}

#[async_trait]
impl ExplanationGenerator for MockExplanationGenerator {
    async fn explain(&self, request: ExplanationRequest<'_>) -> Result<String, PortError> {
        if self.fail {
            return Err(PortError::ServiceUnavailable {
                service: "ollama".to_string(),
            });
        }
        Ok(format!(
            "Assessment for {}/{}: {}",
            request.insurer,
            request.policy_category,
            request.reasons.join("; ")
        ))
    }
}

#[derive(Default)]
struct StoreState {
    claims: HashMap<ClaimId, Claim>,
    artifacts: HashMap<ClaimId, ClaimArtifacts>,
}

/// In-memory claim store with optional forced failures
#[derive(Default)]
pub struct InMemoryClaimStore {
    state: Mutex<StoreState>,
    fail_create: bool,
    fail_finalize: bool,
}

impl InMemoryClaimStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn failing_finalize() -> Self {
        Self {
            fail_finalize: true,
            ..Self::default()
        }
    }

    /// Current state of a stored claim, for assertions
    pub fn claim_state(&self, claim_id: ClaimId) -> Option<ClaimState> {
        self.state
            .lock()
            .unwrap()
            .claims
            .get(&claim_id)
            .map(|c| c.state)
    }

    /// Persisted artifacts for a claim, for assertions
    pub fn stored_artifacts(&self, claim_id: ClaimId) -> Option<ClaimArtifacts> {
        self.state
            .lock()
            .unwrap()
            .artifacts
            .get(&claim_id)
            .cloned()
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn create_processing(&self, claim: &Claim) -> Result<(), PortError> {
        if self.fail_create {
            return Err(PortError::connection("database unavailable"));
        }
        self.state
            .lock()
            .unwrap()
            .claims
            .insert(claim.id, claim.clone());
        Ok(())
    }

    async fn finalize(
        &self,
        claim_id: ClaimId,
        artifacts: &ClaimArtifacts,
    ) -> Result<(), PortError> {
        if self.fail_finalize {
            return Err(PortError::connection("database unavailable"));
        }
        let mut state = self.state.lock().unwrap();
        let claim = state
            .claims
            .get_mut(&claim_id)
            .ok_or_else(|| PortError::not_found("Claim", claim_id))?;
        claim
            .finalize(&artifacts.decision)
            .map_err(|e| PortError::internal(e.to_string()))?;
        state.artifacts.insert(claim_id, artifacts.clone());
        Ok(())
    }

    async fn mark_error(&self, claim_id: ClaimId) -> Result<(), PortError> {
        let mut state = self.state.lock().unwrap();
        if let Some(claim) = state.claims.get_mut(&claim_id) {
            claim.mark_error();
        }
        Ok(())
    }

    async fn get(&self, claim_id: ClaimId) -> Result<Claim, PortError> {
        self.state
            .lock()
            .unwrap()
            .claims
            .get(&claim_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Claim", claim_id))
    }

    async fn list(&self, filter: &ClaimFilter) -> Result<Vec<Claim>, PortError> {
        let state = self.state.lock().unwrap();
        let mut claims: Vec<Claim> = state
            .claims
            .values()
            .filter(|c| {
                filter
                    .insurer
                    .as_ref()
                    .map(|insurer| &c.insurer == insurer)
                    .unwrap_or(true)
            })
            .filter(|c| {
                filter
                    .user_id
                    .map(|user| c.user_id == Some(user))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        claims.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        claims.truncate(filter.limit.unwrap_or(100) as usize);
        Ok(claims)
    }

    async fn latest_survey(&self, claim_id: ClaimId) -> Result<Option<SurveyRecord>, PortError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .artifacts
            .get(&claim_id)
            .map(|a| a.survey.clone()))
    }

    async fn latest_explanation(
        &self,
        claim_id: ClaimId,
    ) -> Result<Option<ExplanationRecord>, PortError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .artifacts
            .get(&claim_id)
            .map(|a| a.explanation.clone()))
    }
}
