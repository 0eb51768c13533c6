//! Retrieval engine - candidate selection, ranking, and prioritization

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

use core_kernel::PortError;

use crate::clause::ClauseRecord;
use crate::error::RetrievalError;
use crate::index::EvidenceIndex;
use crate::reasons::{detect_reasons, ReasonCode, SUPPORT_CONTEXT_KEYWORDS};
use crate::search::{select_backend, NearestNeighbors};

/// Candidate pool size for reason-aware retrieval
pub const RETRIEVAL_TOP_K: usize = 15;

/// Maximum number of secondary (supporting-context) clauses returned
pub const SECONDARY_CAP: usize = 5;

/// Embeds query text into the index's vector space.
///
/// The embedding model itself is an external collaborator; implementations
/// live in the adapter crate.
#[async_trait]
pub trait QueryEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PortError>;
}

/// Two-tier retrieval output.
///
/// `primary` clauses directly justify detected rejection reasons or match
/// the query topically; `secondary` clauses are generic supporting context,
/// filtered and capped. Both preserve similarity-rank order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub primary: Vec<ClauseRecord>,
    pub secondary: Vec<ClauseRecord>,
}

impl RetrievalResult {
    /// Primary-then-secondary iteration order
    pub fn combined(&self) -> impl Iterator<Item = &ClauseRecord> {
        self.primary.iter().chain(self.secondary.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty()
    }
}

enum IndexSource {
    /// Load lazily from an artifact directory on first use
    Artifact(PathBuf),
    /// Index supplied up front (tests, embedded deployments)
    Preloaded,
}

struct Loaded {
    index: EvidenceIndex,
    backend: Box<dyn NearestNeighbors>,
}

/// Reason-aware clause retrieval over the evidence index.
///
/// The index and its search backend are loaded once per process on first
/// use; the `OnceCell` guard makes concurrent first calls share a single
/// load. All state is read-only after initialization, so one engine is
/// safely shared across concurrently processed claims.
pub struct RetrievalEngine {
    source: IndexSource,
    embedder: Arc<dyn QueryEmbedder>,
    loaded: OnceCell<Loaded>,
}

impl RetrievalEngine {
    /// Engine backed by an artifact directory, loaded lazily.
    pub fn new(artifact_dir: impl Into<PathBuf>, embedder: Arc<dyn QueryEmbedder>) -> Self {
        Self {
            source: IndexSource::Artifact(artifact_dir.into()),
            embedder,
            loaded: OnceCell::new(),
        }
    }

    /// Engine over an already-built index with an explicit backend.
    pub fn with_index(
        index: EvidenceIndex,
        backend: Box<dyn NearestNeighbors>,
        embedder: Arc<dyn QueryEmbedder>,
    ) -> Self {
        Self {
            source: IndexSource::Preloaded,
            embedder,
            loaded: OnceCell::new_with(Some(Loaded { index, backend })),
        }
    }

    async fn loaded(&self) -> Result<&Loaded, RetrievalError> {
        self.loaded
            .get_or_try_init(|| async {
                let IndexSource::Artifact(dir) = &self.source else {
                    return Err(RetrievalError::artifact("no artifact directory configured"));
                };
                // File reads happen off the request-serving thread
                let dir = dir.clone();
                let loaded = tokio::task::spawn_blocking(move || {
                    let index = EvidenceIndex::load(&dir)?;
                    let backend = select_backend(&dir, &index);
                    Ok::<_, RetrievalError>(Loaded { index, backend })
                })
                .await
                .map_err(|err| {
                    RetrievalError::artifact(format!("index load task failed: {err}"))
                })??;
                tracing::info!(
                    clauses = loaded.index.len(),
                    dim = loaded.index.dim(),
                    backend = loaded.backend.name(),
                    "evidence index loaded"
                );
                Ok(loaded)
            })
            .await
    }

    /// Returns the top `k` clauses for `(insurer, category)` ranked by
    /// ascending distance to the embedded query.
    ///
    /// An insurer/category pair absent from the index (after the fallback
    /// tiers) yields an empty list, not an error; the query is only embedded
    /// once a non-empty candidate set exists.
    pub async fn retrieve(
        &self,
        query: &str,
        insurer: &str,
        category: &str,
        k: usize,
    ) -> Result<Vec<ClauseRecord>, RetrievalError> {
        let loaded = self.loaded().await?;
        let candidates = loaded.index.candidate_indices(insurer, category);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = self.embedder.embed(query).await?;
        if query_vec.len() != loaded.index.dim() {
            return Err(RetrievalError::DimensionMismatch {
                expected: loaded.index.dim(),
                actual: query_vec.len(),
            });
        }

        let ranked = loaded.backend.rank(&loaded.index, &candidates, &query_vec, k);
        Ok(ranked
            .into_iter()
            .map(|i| loaded.index.clause(i).clone())
            .collect())
    }

    /// Retrieves candidates and partitions them into primary/secondary tiers.
    pub async fn reason_aware(
        &self,
        query: &str,
        insurer: &str,
        category: &str,
    ) -> Result<RetrievalResult, RetrievalError> {
        let detected = detect_reasons(query);
        let candidates = self.retrieve(query, insurer, category, RETRIEVAL_TOP_K).await?;
        let (primary, secondary) = partition_by_reason(candidates, &detected, query);
        let secondary = filter_supporting_context(secondary);
        Ok(RetrievalResult { primary, secondary })
    }
}

/// Splits ranked candidates into primary and secondary tiers.
///
/// A candidate is primary when its text contains a keyword of any detected
/// reason code, or when a content word (length > 3) of its topic label is a
/// substring of the query. The topic test runs against the whole
/// un-tokenized query, so a topic word may match inside an unrelated query
/// word; known approximation, do not tokenize without product input.
///
/// Both outputs preserve the incoming rank order (stable partition).
pub fn partition_by_reason(
    results: Vec<ClauseRecord>,
    detected: &BTreeSet<ReasonCode>,
    query: &str,
) -> (Vec<ClauseRecord>, Vec<ClauseRecord>) {
    let query_lower = query.to_lowercase();
    let mut primary = Vec::new();
    let mut secondary = Vec::new();

    for record in results {
        let text = record.text.to_lowercase();
        let topic = record
            .topic_label
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        let reason_match = detected
            .iter()
            .any(|code| code.keywords().iter().any(|kw| text.contains(kw)));

        // Topic labels are stored as "Topic: theft burglary ..."
        let stripped = topic.replace("topic:", "");
        let topic_match = stripped
            .split_whitespace()
            .filter(|w| w.len() > 3)
            .any(|w| query_lower.contains(w));

        if reason_match || topic_match {
            primary.push(record);
        } else {
            secondary.push(record);
        }
    }

    (primary, secondary)
}

/// Keeps secondary clauses that carry generic supporting context, capped at
/// [`SECONDARY_CAP`] in original rank order.
pub fn filter_supporting_context(secondary: Vec<ClauseRecord>) -> Vec<ClauseRecord> {
    let mut kept: Vec<ClauseRecord> = secondary
        .into_iter()
        .filter(|record| {
            let text = record.text.to_lowercase();
            SUPPORT_CONTEXT_KEYWORDS.iter().any(|kw| text.contains(kw))
        })
        .collect();
    kept.truncate(SECONDARY_CAP);
    kept
}
