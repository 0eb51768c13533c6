//! Test Utilities
//!
//! Shared builders, fixtures, and mock collaborators for the claims test
//! suite. Builders construct domain data with sensible defaults so tests
//! only specify the fields they care about; mocks implement the collaborator
//! ports with canned results or forced failures.

pub mod builders;
pub mod fixtures;
pub mod mocks;

pub use builders::{ImageFindingsBuilder, SurveyFactsBuilder};
pub use fixtures::{clause, sample_clauses, sample_engine, sample_index, StubEmbedder, EMBED_DIM};
pub use mocks::{
    InMemoryClaimStore, MockExplanationGenerator, MockImageAnalyzer, MockKeywordExtractor,
    MockTabularPredictor,
};
