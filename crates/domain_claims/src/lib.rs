//! Claims Adjudication Domain
//!
//! This crate holds the core of the adjudication pipeline:
//!
//! - **Data model**: typed survey payloads, image-derived damage findings,
//!   and the persisted `Claim` aggregate with its state machine
//! - **Decision Engine**: the pure rule evaluation turning survey facts and
//!   image findings into a verdict, risk tier, and reasons
//! - **Ports**: traits for the external collaborators (image model, keyword
//!   extraction, tabular prediction, explanation generation, persistence)
//! - **Orchestrator**: the per-claim pipeline with per-stage failure
//!   isolation

pub mod claim;
pub mod decision;
pub mod error;
pub mod features;
pub mod image;
pub mod ports;
pub mod processor;
pub mod stage;
pub mod survey;

pub use claim::{Claim, ClaimState};
pub use decision::{decide, Decision, FinalDecision, RiskLevel};
pub use error::ClaimError;
pub use image::{Claimability, EvidenceStrength, ImageFindings, Severity};
pub use ports::{
    ClaimArtifacts, ClaimFilter, ClaimStore, ExplanationGenerator, ExplanationRecord,
    ExplanationRequest, ImageAnalyzer, ImageRecord, KeywordExtraction, KeywordExtractor,
    PredictionOutcome, SurveyRecord, TabularPredictor, FALLBACK_EXPLANATION,
};
pub use processor::{ClaimInput, ClaimOutcome, ClaimProcessor, ProcessError};
pub use survey::{AccidentSpecifics, ComputedFlags, SectionMap, SurveyFacts};
