//! Claim orchestration pipeline
//!
//! Sequences image inference, keyword extraction, clause retrieval, rule
//! evaluation, tabular enrichment, explanation generation, and persistence
//! for one claim. Stages 2-7 degrade to safe defaults on failure; the
//! initial checkpoint write and the final atomic persistence are the only
//! failures surfaced to the caller.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use core_kernel::{ClaimId, PortError, UserId};
use domain_retrieval::{ClauseRecord, RetrievalEngine, RetrievalResult};

use crate::claim::Claim;
use crate::decision::{decide, Decision};
use crate::error::ClaimError;
use crate::features::tabular_features;
use crate::image::ImageFindings;
use crate::ports::{
    ClaimArtifacts, ClaimStore, ExplanationGenerator, ExplanationRecord, ExplanationRequest,
    ImageAnalyzer, ImageRecord, KeywordExtraction, KeywordExtractor, PredictionOutcome,
    SurveyRecord, TabularPredictor, FALLBACK_EXPLANATION,
};
use crate::stage::degrade;
use crate::survey::SurveyFacts;

/// How many clauses (primary first, then secondary) feed the explanation
pub const SELECTED_CLAUSES: usize = 5;

/// Raw claim input consumed by the pipeline
#[derive(Debug, Clone)]
pub struct ClaimInput {
    pub user_id: Option<UserId>,
    pub insurer: String,
    pub policy_category: String,
    pub description: String,
    pub survey: SurveyFacts,
    pub image_refs: Vec<String>,
}

/// Assembled result of one processing attempt
#[derive(Debug, Clone)]
pub struct ClaimOutcome {
    pub claim_id: ClaimId,
    pub decision: Decision,
    pub keywords: KeywordExtraction,
    pub clauses_used: Vec<ClauseRecord>,
    pub explanation: String,
    pub image_findings: Option<ImageFindings>,
}

/// Fatal pipeline failures
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The initial claim checkpoint could not be written
    #[error("Failed to checkpoint claim: {0}")]
    Checkpoint(#[source] PortError),

    /// The final persistence commit failed; the claim was marked `ERROR`
    #[error("Failed to persist claim {claim_id}: {source}")]
    Persistence {
        claim_id: ClaimId,
        #[source]
        source: PortError,
    },

    #[error(transparent)]
    InvalidState(#[from] ClaimError),
}

/// The top-level per-claim pipeline.
///
/// Holds only shared read-only collaborators, so one processor serves any
/// number of concurrent claims; ordering within one claim is strictly
/// sequential.
pub struct ClaimProcessor {
    image_analyzer: Arc<dyn ImageAnalyzer>,
    keyword_extractor: Arc<dyn KeywordExtractor>,
    retrieval: Arc<RetrievalEngine>,
    tabular: Arc<dyn TabularPredictor>,
    explainer: Arc<dyn ExplanationGenerator>,
    store: Arc<dyn ClaimStore>,
}

impl ClaimProcessor {
    pub fn new(
        image_analyzer: Arc<dyn ImageAnalyzer>,
        keyword_extractor: Arc<dyn KeywordExtractor>,
        retrieval: Arc<RetrievalEngine>,
        tabular: Arc<dyn TabularPredictor>,
        explainer: Arc<dyn ExplanationGenerator>,
        store: Arc<dyn ClaimStore>,
    ) -> Self {
        Self {
            image_analyzer,
            keyword_extractor,
            retrieval,
            tabular,
            explainer,
            store,
        }
    }

    /// Processes one claim end to end and persists the outcome.
    ///
    /// A claim whose degradable stages all failed still resolves to a
    /// coherent decision and explanation; only checkpoint or persistence
    /// failures return an error.
    pub async fn process(&self, input: ClaimInput) -> Result<ClaimOutcome, ProcessError> {
        let ClaimInput {
            user_id,
            insurer,
            policy_category,
            description,
            mut survey,
            image_refs,
        } = input;

        // Durable checkpoint before any heavy work
        let mut claim = Claim::received(
            user_id,
            insurer.clone(),
            policy_category.clone(),
            description.clone(),
        );
        claim.begin_processing()?;
        self.store
            .create_processing(&claim)
            .await
            .map_err(ProcessError::Checkpoint)?;
        let claim_id = claim.id;
        tracing::info!(
            claim_id = %claim_id,
            insurer = %insurer,
            policy_category = %policy_category,
            "claim checkpointed, processing"
        );

        let image_findings = if image_refs.is_empty() {
            None
        } else {
            Some(
                degrade(
                    "image_inference",
                    claim_id,
                    ImageFindings::inconclusive("Image analysis unavailable"),
                    self.image_analyzer.analyze(&image_refs),
                )
                .await,
            )
        };

        let keywords = degrade(
            "keyword_extraction",
            claim_id,
            KeywordExtraction::default(),
            self.keyword_extractor.extract(&description),
        )
        .await;

        let query = build_query(&description, &keywords.keywords);
        let retrieval = degrade(
            "clause_retrieval",
            claim_id,
            RetrievalResult::default(),
            self.retrieval
                .reason_aware(&query, &insurer, &policy_category),
        )
        .await;

        // Pure rule evaluation - never fails
        let neutral = ImageFindings::default();
        let decision = decide(&survey, image_findings.as_ref().unwrap_or(&neutral));

        if !survey.has_prediction() {
            self.enrich_with_prediction(claim_id, &mut survey).await;
        }

        let clauses_used: Vec<ClauseRecord> =
            retrieval.combined().take(SELECTED_CLAUSES).cloned().collect();
        let explanation = degrade(
            "explanation_generation",
            claim_id,
            FALLBACK_EXPLANATION.to_string(),
            self.explainer.explain(ExplanationRequest {
                insurer: &insurer,
                policy_category: &policy_category,
                reasons: &decision.reasons,
                clauses: &clauses_used,
                image_findings: image_findings.as_ref(),
            }),
        )
        .await;

        claim.finalize(&decision)?;

        let artifacts = ClaimArtifacts {
            decision: decision.clone(),
            survey: SurveyRecord {
                prediction: survey.prediction.clone(),
                probability: survey.probability,
                payload: survey,
            },
            images: image_findings
                .as_ref()
                .map(|findings| {
                    image_refs
                        .iter()
                        .map(|image_ref| ImageRecord {
                            filename: file_name(image_ref),
                            findings: findings.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default(),
            explanation: ExplanationRecord {
                extracted_keywords: keywords.clone(),
                clauses_used: clauses_used.clone(),
                explanation_text: explanation.clone(),
            },
        };

        if let Err(source) = self.store.finalize(claim_id, &artifacts).await {
            tracing::error!(claim_id = %claim_id, error = %source, "claim persistence failed");
            if let Err(mark) = self.store.mark_error(claim_id).await {
                tracing::error!(claim_id = %claim_id, error = %mark, "failed to mark claim ERROR");
            }
            return Err(ProcessError::Persistence { claim_id, source });
        }

        tracing::info!(
            claim_id = %claim_id,
            decision = %decision.final_decision,
            risk = %decision.risk_level,
            "claim processed"
        );

        Ok(ClaimOutcome {
            claim_id,
            decision,
            keywords,
            clauses_used,
            explanation,
            image_findings,
        })
    }

    /// Derives a tabular-model verdict for surveys submitted without one and
    /// merges it into the payload. Collaborator failures leave the
    /// prediction null; a structured missing-fields response is logged, not
    /// raised.
    async fn enrich_with_prediction(&self, claim_id: ClaimId, survey: &mut SurveyFacts) {
        let features = tabular_features(survey);
        let outcome = degrade("tabular_prediction", claim_id, None, async {
            self.tabular.predict(&features).await.map(Some)
        })
        .await;

        match outcome {
            Some(PredictionOutcome::Scored {
                prediction,
                probability,
            }) => survey.apply_prediction(prediction, probability),
            Some(PredictionOutcome::MissingFields { required, missing }) => {
                tracing::warn!(
                    claim_id = %claim_id,
                    ?missing,
                    "tabular model reported missing fields, leaving prediction null"
                );
                // Surfaced through the persisted payload, as a structured
                // result rather than an error
                survey
                    .extra
                    .insert("error".to_string(), "missing required fields".into());
                survey
                    .extra
                    .insert("required_fields".to_string(), required.into());
                survey
                    .extra
                    .insert("missing_fields".to_string(), missing.into());
            }
            None => {}
        }
    }
}

/// Retrieval query: the description concatenated with extracted keywords,
/// or the bare description when extraction produced nothing.
fn build_query(description: &str, keywords: &[String]) -> String {
    let joined = keywords.join(" ");
    let mut parts: Vec<&str> = Vec::new();
    if !description.is_empty() {
        parts.push(description);
    }
    if !joined.is_empty() {
        parts.push(&joined);
    }
    if parts.is_empty() {
        description.to_string()
    } else {
        parts.join(" ")
    }
}

fn file_name(image_ref: &str) -> String {
    Path::new(image_ref)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| image_ref.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_appends_keywords() {
        let keywords = vec!["bumper".to_string(), "dent".to_string()];
        assert_eq!(
            build_query("hit a divider", &keywords),
            "hit a divider bumper dent"
        );
    }

    #[test]
    fn test_build_query_bare_description_without_keywords() {
        assert_eq!(build_query("hit a divider", &[]), "hit a divider");
    }

    #[test]
    fn test_file_name_strips_directories() {
        assert_eq!(file_name("uploads/2024/crash.jpg"), "crash.jpg");
        assert_eq!(file_name("crash.jpg"), "crash.jpg");
    }
}
