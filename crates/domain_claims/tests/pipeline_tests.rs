//! Claim pipeline orchestration tests
//!
//! Runs the processor against mock collaborators and the in-memory store,
//! covering the happy path, per-stage degradation, and the fatal
//! persistence path.

use std::sync::Arc;

use domain_claims::{
    Claimability, ClaimInput, ClaimProcessor, ClaimState, FinalDecision, ProcessError, RiskLevel,
    FALLBACK_EXPLANATION,
};
use domain_retrieval::RetrievalEngine;
use test_utils::{
    sample_engine, ImageFindingsBuilder, InMemoryClaimStore, MockExplanationGenerator,
    MockImageAnalyzer, MockKeywordExtractor, MockTabularPredictor, StubEmbedder,
    SurveyFactsBuilder,
};

struct Harness {
    store: Arc<InMemoryClaimStore>,
    processor: ClaimProcessor,
}

fn harness(
    image: MockImageAnalyzer,
    keywords: MockKeywordExtractor,
    retrieval: Arc<RetrievalEngine>,
    tabular: MockTabularPredictor,
    explainer: MockExplanationGenerator,
    store: InMemoryClaimStore,
) -> Harness {
    let store = Arc::new(store);
    let processor = ClaimProcessor::new(
        Arc::new(image),
        Arc::new(keywords),
        retrieval,
        Arc::new(tabular),
        Arc::new(explainer),
        store.clone(),
    );
    Harness { store, processor }
}

fn default_harness() -> Harness {
    harness(
        MockImageAnalyzer::returning(ImageFindingsBuilder::claimable().build()),
        MockKeywordExtractor::returning(&["bumper", "dent"]),
        sample_engine(),
        MockTabularPredictor::scored("APPROVED", 0.91),
        MockExplanationGenerator::new(),
        InMemoryClaimStore::new(),
    )
}

fn clean_input() -> ClaimInput {
    ClaimInput {
        user_id: None,
        insurer: "Acko".to_string(),
        policy_category: "Two Wheeler".to_string(),
        description: "Rear-ended at a signal, bumper dented".to_string(),
        survey: SurveyFactsBuilder::clean().build(),
        image_refs: vec!["uploads/crash_front.jpg".to_string()],
    }
}

/// Engine whose artifact directory does not exist, so every retrieval errs
fn broken_retrieval() -> Arc<RetrievalEngine> {
    Arc::new(RetrievalEngine::new(
        "/nonexistent/rag_index",
        Arc::new(StubEmbedder),
    ))
}

#[tokio::test]
async fn clean_claim_is_approved_and_persisted() {
    let h = default_harness();

    let outcome = h.processor.process(clean_input()).await.unwrap();

    assert_eq!(outcome.decision.final_decision, FinalDecision::Approved);
    assert_eq!(outcome.decision.risk_level, RiskLevel::Low);
    assert_eq!(outcome.decision.reasons, vec!["All checks passed"]);
    assert!(!outcome.clauses_used.is_empty());
    assert!(outcome.clauses_used.len() <= 5);
    assert!(outcome.explanation.starts_with("Assessment for Acko/Two Wheeler"));

    assert_eq!(
        h.store.claim_state(outcome.claim_id),
        Some(ClaimState::Approved)
    );
    let artifacts = h.store.stored_artifacts(outcome.claim_id).unwrap();
    assert_eq!(artifacts.images.len(), 1);
    assert_eq!(artifacts.images[0].filename, "crash_front.jpg");
    assert_eq!(artifacts.explanation.extracted_keywords.keywords, vec!["bumper", "dent"]);
}

#[tokio::test]
async fn intoxicated_driver_claim_is_rejected() {
    let h = default_harness();
    let mut input = clean_input();
    input.survey = SurveyFactsBuilder::clean().with_alcohol_intoxicated(true).build();

    let outcome = h.processor.process(input).await.unwrap();

    assert_eq!(outcome.decision.final_decision, FinalDecision::Rejected);
    assert_eq!(outcome.decision.risk_level, RiskLevel::High);
    assert!(outcome
        .decision
        .reasons
        .contains(&"Driver Alcohol Intoxication Detected".to_string()));
    assert_eq!(
        h.store.claim_state(outcome.claim_id),
        Some(ClaimState::Rejected)
    );
}

#[tokio::test]
async fn image_failure_degrades_without_losing_the_claim() {
    let h = harness(
        MockImageAnalyzer::failing(),
        MockKeywordExtractor::returning(&["bumper"]),
        sample_engine(),
        MockTabularPredictor::scored("APPROVED", 0.8),
        MockExplanationGenerator::new(),
        InMemoryClaimStore::new(),
    );

    let outcome = h.processor.process(clean_input()).await.unwrap();

    // Decision and explanation are present, image findings degraded to the
    // inconclusive default (no claimability, so no image rule fired)
    assert_eq!(outcome.decision.final_decision, FinalDecision::Approved);
    assert!(!outcome.explanation.is_empty());
    let findings = outcome.image_findings.unwrap();
    assert!(findings.claimability.is_none());
    assert!(!findings.damage_detected);

    // One image row is still persisted per uploaded image
    let artifacts = h.store.stored_artifacts(outcome.claim_id).unwrap();
    assert_eq!(artifacts.images.len(), 1);
}

#[tokio::test]
async fn every_degradable_stage_failing_still_yields_a_result() {
    let h = harness(
        MockImageAnalyzer::failing(),
        MockKeywordExtractor::failing(),
        broken_retrieval(),
        MockTabularPredictor::failing(),
        MockExplanationGenerator::failing(),
        InMemoryClaimStore::new(),
    );

    let outcome = h.processor.process(clean_input()).await.unwrap();

    assert_eq!(outcome.decision.final_decision, FinalDecision::Approved);
    assert!(outcome.clauses_used.is_empty());
    assert_eq!(outcome.explanation, FALLBACK_EXPLANATION);
    assert_eq!(outcome.keywords.keywords.len(), 0);
    assert_eq!(
        h.store.claim_state(outcome.claim_id),
        Some(ClaimState::Approved)
    );
}

#[tokio::test]
async fn survey_without_prediction_is_enriched_before_persistence() {
    let h = default_harness();

    let outcome = h.processor.process(clean_input()).await.unwrap();

    let survey = h.store.stored_artifacts(outcome.claim_id).unwrap().survey;
    assert_eq!(survey.prediction.as_deref(), Some("APPROVED"));
    assert_eq!(survey.probability, Some(0.91));
    assert_eq!(survey.payload.probability, Some(0.91));
}

#[tokio::test]
async fn survey_with_prior_prediction_is_left_alone() {
    let h = default_harness();
    let mut input = clean_input();
    input.survey = SurveyFactsBuilder::clean().with_prediction("APPROVED", 0.55).build();

    let outcome = h.processor.process(input).await.unwrap();

    let survey = h.store.stored_artifacts(outcome.claim_id).unwrap().survey;
    assert_eq!(survey.probability, Some(0.55));
}

#[tokio::test]
async fn tabular_missing_fields_leaves_prediction_null() {
    let h = harness(
        MockImageAnalyzer::returning(ImageFindingsBuilder::claimable().build()),
        MockKeywordExtractor::returning(&[]),
        sample_engine(),
        MockTabularPredictor::missing_fields(&["car_age", "driver_age"], &["driver_age"]),
        MockExplanationGenerator::new(),
        InMemoryClaimStore::new(),
    );

    let outcome = h.processor.process(clean_input()).await.unwrap();

    let survey = h.store.stored_artifacts(outcome.claim_id).unwrap().survey;
    assert_eq!(survey.prediction, None);
    assert_eq!(survey.probability, None);
    // The structured report is surfaced through the persisted payload
    assert_eq!(
        survey.payload.extra.get("missing_fields"),
        Some(&serde_json::json!(["driver_age"]))
    );
}

#[tokio::test]
async fn claim_without_images_skips_image_stage() {
    let h = default_harness();
    let mut input = clean_input();
    input.image_refs.clear();

    let outcome = h.processor.process(input).await.unwrap();

    assert!(outcome.image_findings.is_none());
    let artifacts = h.store.stored_artifacts(outcome.claim_id).unwrap();
    assert!(artifacts.images.is_empty());
}

#[tokio::test]
async fn rejected_image_verdict_drives_the_decision() {
    let h = harness(
        MockImageAnalyzer::returning(
            ImageFindingsBuilder::new()
                .with_claimability(Claimability::NotClaimable)
                .with_final_reason("Only small scratches/dents detected")
                .build(),
        ),
        MockKeywordExtractor::returning(&[]),
        sample_engine(),
        MockTabularPredictor::scored("APPROVED", 0.7),
        MockExplanationGenerator::new(),
        InMemoryClaimStore::new(),
    );

    let outcome = h.processor.process(clean_input()).await.unwrap();

    assert_eq!(outcome.decision.final_decision, FinalDecision::Rejected);
    assert_eq!(
        outcome.decision.reasons,
        vec!["Only small scratches/dents detected"]
    );
}

#[tokio::test]
async fn checkpoint_failure_is_fatal() {
    let h = harness(
        MockImageAnalyzer::returning(ImageFindingsBuilder::claimable().build()),
        MockKeywordExtractor::returning(&[]),
        sample_engine(),
        MockTabularPredictor::scored("APPROVED", 0.9),
        MockExplanationGenerator::new(),
        InMemoryClaimStore::failing_create(),
    );

    let err = h.processor.process(clean_input()).await.unwrap_err();
    assert!(matches!(err, ProcessError::Checkpoint(_)));
}

#[tokio::test]
async fn persistence_failure_marks_claim_error_and_propagates() {
    let h = harness(
        MockImageAnalyzer::returning(ImageFindingsBuilder::claimable().build()),
        MockKeywordExtractor::returning(&[]),
        sample_engine(),
        MockTabularPredictor::scored("APPROVED", 0.9),
        MockExplanationGenerator::new(),
        InMemoryClaimStore::failing_finalize(),
    );

    let err = h.processor.process(clean_input()).await.unwrap_err();

    let ProcessError::Persistence { claim_id, .. } = err else {
        panic!("expected persistence error, got {err:?}");
    };
    assert_eq!(h.store.claim_state(claim_id), Some(ClaimState::Error));
}
