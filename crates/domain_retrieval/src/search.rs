//! Nearest-neighbor search backends
//!
//! Two implementations of the same exact ranking, selected once at index
//! load based on artifact availability: [`FlatIndexSearch`] consumes a
//! precomputed squared-norm file and ranks by `‖v‖² − 2·v·q` (which orders
//! identically to the full L2 distance, since `‖q‖²` is constant across
//! candidates); [`LinearScanSearch`] computes the full Euclidean distance
//! per candidate. Ties break by ordinal index, so both backends are
//! deterministic on an unchanged index.

use std::path::Path;

use crate::error::RetrievalError;
use crate::index::EvidenceIndex;

/// Precomputed-norm file name inside the artifact directory
pub const NORMS_FILE: &str = "norms.bin";

/// Ranks candidate ordinals by ascending distance to a query vector.
pub trait NearestNeighbors: Send + Sync {
    /// Returns at most `k` ordinals from `candidates`, closest first.
    fn rank(
        &self,
        index: &EvidenceIndex,
        candidates: &[usize],
        query: &[f32],
        k: usize,
    ) -> Vec<usize>;

    /// Backend name for logs
    fn name(&self) -> &'static str;
}

/// Exact brute-force Euclidean scan over the candidate subset.
#[derive(Debug, Default)]
pub struct LinearScanSearch;

impl NearestNeighbors for LinearScanSearch {
    fn rank(
        &self,
        index: &EvidenceIndex,
        candidates: &[usize],
        query: &[f32],
        k: usize,
    ) -> Vec<usize> {
        let mut scored: Vec<(f32, usize)> = candidates
            .iter()
            .map(|&i| (squared_distance(index.vector(i), query), i))
            .collect();
        take_k(&mut scored, k)
    }

    fn name(&self) -> &'static str {
        "linear_scan"
    }
}

/// Flat index backed by precomputed squared norms.
#[derive(Debug)]
pub struct FlatIndexSearch {
    norms: Vec<f32>,
}

impl FlatIndexSearch {
    /// Loads the norm artifact for `index`, validating one norm per row.
    pub fn load(dir: &Path, index: &EvidenceIndex) -> Result<Self, RetrievalError> {
        let path = dir.join(NORMS_FILE);
        let bytes =
            std::fs::read(&path).map_err(|e| RetrievalError::io(path.display().to_string(), e))?;
        if bytes.len() % 4 != 0 {
            return Err(RetrievalError::artifact(format!(
                "norm file length {} is not a multiple of 4",
                bytes.len()
            )));
        }
        let norms: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Self::from_norms(norms, index)
    }

    /// Builds the backend from already-decoded norms.
    pub fn from_norms(norms: Vec<f32>, index: &EvidenceIndex) -> Result<Self, RetrievalError> {
        if norms.len() != index.len() {
            return Err(RetrievalError::artifact(format!(
                "norm file has {} entries for {} clauses",
                norms.len(),
                index.len()
            )));
        }
        Ok(Self { norms })
    }
}

impl NearestNeighbors for FlatIndexSearch {
    fn rank(
        &self,
        index: &EvidenceIndex,
        candidates: &[usize],
        query: &[f32],
        k: usize,
    ) -> Vec<usize> {
        let mut scored: Vec<(f32, usize)> = candidates
            .iter()
            .map(|&i| (self.norms[i] - 2.0 * dot(index.vector(i), query), i))
            .collect();
        take_k(&mut scored, k)
    }

    fn name(&self) -> &'static str {
        "flat_index"
    }
}

/// Selects the search backend for an artifact directory: the flat index when
/// its norm file is present and consistent, the linear scan otherwise.
pub fn select_backend(dir: &Path, index: &EvidenceIndex) -> Box<dyn NearestNeighbors> {
    match FlatIndexSearch::load(dir, index) {
        Ok(backend) => Box::new(backend),
        Err(err) => {
            tracing::debug!(error = %err, "norm artifact unavailable, using linear scan");
            Box::new(LinearScanSearch)
        }
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn take_k(scored: &mut Vec<(f32, usize)>, k: usize) -> Vec<usize> {
    scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    scored.iter().take(k).map(|&(_, i)| i).collect()
}
