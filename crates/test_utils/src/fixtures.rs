//! Retrieval fixtures
//!
//! A small in-memory evidence index with deterministic embeddings, plus the
//! stub embedder that matches it.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::sync::Arc;

use core_kernel::PortError;
use domain_retrieval::{
    ClauseRecord, EvidenceIndex, LinearScanSearch, QueryEmbedder, RetrievalEngine,
};

/// Embedding dimension used by all fixtures
pub const EMBED_DIM: usize = 8;

static CLAUSES: Lazy<Vec<ClauseRecord>> = Lazy::new(|| {
    vec![
        clause(
            "Acko",
            "Two Wheeler",
            "Claims arising while the driver is under the influence of alcohol or drugs shall be repudiated",
            Some("Topic: alcohol intoxication driving"),
        ),
        clause(
            "Acko",
            "Two Wheeler",
            "The insured must hold a valid driving licence at the time of the accident",
            Some("Topic: licence validity driver"),
        ),
        clause(
            "Acko",
            "Two Wheeler",
            "Any claim intimation must reach the insurer within seven days of the accident",
            None,
        ),
        clause(
            "Acko",
            "Two Wheeler",
            "The policy covers the insured vehicle against accidental external damage",
            None,
        ),
        clause(
            "Acko",
            "Two Wheeler",
            "Wear and tear and mechanical breakdown are excluded from coverage",
            Some("Topic: mechanical breakdown exclusions"),
        ),
        clause(
            "Navi",
            "Car",
            "Comprehensive car policy wording and conditions",
            None,
        ),
    ]
});

/// Clause record with fixture defaults
pub fn clause(insurer: &str, category: &str, text: &str, topic: Option<&str>) -> ClauseRecord {
    ClauseRecord {
        insurer: insurer.to_string(),
        policy_category: category.to_string(),
        doc_id: Some("policy_wording.pdf".to_string()),
        clause_id: None,
        clause_type: Some("exclusion".to_string()),
        text: text.to_string(),
        topic_label: topic.map(|t| t.to_string()),
        topic_cluster_id: None,
    }
}

/// The canned clause set behind [`sample_index`]
pub fn sample_clauses() -> Vec<ClauseRecord> {
    CLAUSES.clone()
}

/// In-memory evidence index over [`sample_clauses`], embedded with
/// [`StubEmbedder`]'s deterministic scheme.
pub fn sample_index() -> EvidenceIndex {
    let clauses = sample_clauses();
    let embeddings: Vec<f32> = clauses
        .iter()
        .flat_map(|c| StubEmbedder::vector(&c.text))
        .collect();
    EvidenceIndex::from_parts(clauses, embeddings, EMBED_DIM).unwrap()
}

/// Retrieval engine over the sample index with a linear-scan backend
pub fn sample_engine() -> Arc<RetrievalEngine> {
    Arc::new(RetrievalEngine::with_index(
        sample_index(),
        Box::new(LinearScanSearch),
        Arc::new(StubEmbedder),
    ))
}

/// Deterministic embedder: folds text bytes into a fixed-dimension vector.
/// Not semantically meaningful, but stable across calls, which is what the
/// determinism and ordering tests need.
pub struct StubEmbedder;

impl StubEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; EMBED_DIM];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % EMBED_DIM] += f32::from(byte) / 255.0;
        }
        vector
    }
}

#[async_trait]
impl QueryEmbedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PortError> {
        Ok(Self::vector(text))
    }
}
