//! Evidence index - clause metadata plus embedding vectors
//!
//! The index is built offline and loaded read-only at startup from two
//! files: `clauses.json` (`{"dim": N, "clauses": [...]}`), and
//! `embeddings.bin` (row-major little-endian f32, one row of `dim` values
//! per clause). Records are never mutated at request time.

use serde::Deserialize;
use std::path::Path;

use crate::clause::ClauseRecord;
use crate::error::RetrievalError;

/// Metadata file name inside the artifact directory
pub const CLAUSES_FILE: &str = "clauses.json";
/// Embedding matrix file name inside the artifact directory
pub const EMBEDDINGS_FILE: &str = "embeddings.bin";

/// Fallback pair used when a generic/demo insurer is requested
pub const DEFAULT_INSURER: &str = "Acko";
pub const DEFAULT_CATEGORY: &str = "Two Wheeler";

/// Placeholder insurer names that route to the default pair
const GENERIC_INSURERS: [&str; 2] = ["General", "SafeGuard Insure"];

#[derive(Deserialize)]
struct ClausesArtifact {
    dim: usize,
    clauses: Vec<ClauseRecord>,
}

/// The static, read-only store of embedded clause vectors plus metadata.
#[derive(Debug)]
pub struct EvidenceIndex {
    dim: usize,
    clauses: Vec<ClauseRecord>,
    // Row-major, `dim` values per clause, same ordinal as `clauses`
    embeddings: Vec<f32>,
}

impl EvidenceIndex {
    /// Loads the index from an artifact directory.
    pub fn load(dir: &Path) -> Result<Self, RetrievalError> {
        let meta_path = dir.join(CLAUSES_FILE);
        let raw = std::fs::read_to_string(&meta_path)
            .map_err(|e| RetrievalError::io(meta_path.display().to_string(), e))?;
        let artifact: ClausesArtifact = serde_json::from_str(&raw)?;

        let emb_path = dir.join(EMBEDDINGS_FILE);
        let bytes = std::fs::read(&emb_path)
            .map_err(|e| RetrievalError::io(emb_path.display().to_string(), e))?;
        let embeddings = decode_f32_le(&bytes)?;

        Self::from_parts(artifact.clauses, embeddings, artifact.dim)
    }

    /// Builds an index from already-decoded parts, validating shape.
    pub fn from_parts(
        clauses: Vec<ClauseRecord>,
        embeddings: Vec<f32>,
        dim: usize,
    ) -> Result<Self, RetrievalError> {
        if dim == 0 {
            return Err(RetrievalError::artifact("embedding dimension must be > 0"));
        }
        if embeddings.len() != clauses.len() * dim {
            return Err(RetrievalError::artifact(format!(
                "embedding matrix has {} values, expected {} ({} clauses x dim {})",
                embeddings.len(),
                clauses.len() * dim,
                clauses.len(),
                dim
            )));
        }
        Ok(Self {
            dim,
            clauses,
            embeddings,
        })
    }

    /// Embedding dimension
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of clause records
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Clause record at ordinal `i`
    pub fn clause(&self, i: usize) -> &ClauseRecord {
        &self.clauses[i]
    }

    /// Embedding row for ordinal `i`
    pub fn vector(&self, i: usize) -> &[f32] {
        &self.embeddings[i * self.dim..(i + 1) * self.dim]
    }

    /// Restricts the index to candidates for `(insurer, category)`.
    ///
    /// Fallback tiers, first non-empty wins:
    /// 1. exact match
    /// 2. case-insensitive match
    /// 3. the fixed default pair, when `insurer` is absent or a known
    ///    generic/demo placeholder
    ///
    /// Returns ordinals in index order; an empty result means the caller
    /// must handle zero clauses.
    pub fn candidate_indices(&self, insurer: &str, category: &str) -> Vec<usize> {
        let exact: Vec<usize> = self
            .clauses
            .iter()
            .enumerate()
            .filter(|(_, c)| c.insurer == insurer && c.policy_category == category)
            .map(|(i, _)| i)
            .collect();
        if !exact.is_empty() {
            return exact;
        }

        let relaxed: Vec<usize> = self
            .clauses
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                c.insurer.eq_ignore_ascii_case(insurer)
                    && c.policy_category.eq_ignore_ascii_case(category)
            })
            .map(|(i, _)| i)
            .collect();
        if !relaxed.is_empty() {
            return relaxed;
        }

        if insurer.is_empty() || GENERIC_INSURERS.contains(&insurer) {
            tracing::debug!(
                insurer,
                category,
                "no clauses for requested pair, falling back to {DEFAULT_INSURER}/{DEFAULT_CATEGORY}"
            );
            return self
                .clauses
                .iter()
                .enumerate()
                .filter(|(_, c)| {
                    c.insurer == DEFAULT_INSURER && c.policy_category == DEFAULT_CATEGORY
                })
                .map(|(i, _)| i)
                .collect();
        }

        Vec::new()
    }
}

fn decode_f32_le(bytes: &[u8]) -> Result<Vec<f32>, RetrievalError> {
    if bytes.len() % 4 != 0 {
        return Err(RetrievalError::artifact(format!(
            "embedding file length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(insurer: &str, category: &str) -> ClauseRecord {
        ClauseRecord {
            insurer: insurer.to_string(),
            policy_category: category.to_string(),
            doc_id: None,
            clause_id: None,
            clause_type: None,
            text: "clause".to_string(),
            topic_label: None,
            topic_cluster_id: None,
        }
    }

    fn index(records: Vec<ClauseRecord>) -> EvidenceIndex {
        let n = records.len();
        EvidenceIndex::from_parts(records, vec![0.0; n * 2], 2).unwrap()
    }

    #[test]
    fn test_shape_validation() {
        let err = EvidenceIndex::from_parts(vec![record("A", "B")], vec![0.0; 3], 2);
        assert!(err.is_err());
    }

    #[test]
    fn test_exact_match_wins_over_relaxed() {
        let idx = index(vec![record("Acko", "Two Wheeler"), record("ACKO", "TWO WHEELER")]);
        assert_eq!(idx.candidate_indices("Acko", "Two Wheeler"), vec![0]);
    }

    #[test]
    fn test_case_insensitive_tier() {
        let idx = index(vec![record("Acko", "Two Wheeler")]);
        assert_eq!(idx.candidate_indices("acko", "two wheeler"), vec![0]);
    }

    #[test]
    fn test_generic_insurer_falls_back_to_default_pair() {
        let idx = index(vec![record("Acko", "Two Wheeler"), record("Navi", "Car")]);
        assert_eq!(idx.candidate_indices("General", "Car"), vec![0]);
        assert_eq!(idx.candidate_indices("", "Car"), vec![0]);
    }

    #[test]
    fn test_unknown_insurer_yields_empty() {
        let idx = index(vec![record("Acko", "Two Wheeler")]);
        assert!(idx.candidate_indices("Chola MS", "Car").is_empty());
    }

    #[test]
    fn test_decode_rejects_ragged_file() {
        assert!(decode_f32_le(&[0u8; 5]).is_err());
        assert_eq!(decode_f32_le(&0.5f32.to_le_bytes()).unwrap(), vec![0.5]);
    }
}
