//! Reason-Aware Clause Retrieval
//!
//! This crate selects the policy clauses that justify a claim verdict:
//!
//! - **Evidence Index**: a read-only set of clause records plus their
//!   embedding vectors, loaded once from a precomputed artifact
//! - **Reason Detector**: keyword matching against a fixed taxonomy of
//!   canonical rejection-reason codes
//! - **Search backends**: an indexed backend when the precomputed norm
//!   artifact is available, exact linear scan otherwise
//! - **Retrieval Engine**: candidate restriction with company/category
//!   fallback tiers, similarity ranking, and the two-tier primary/secondary
//!   prioritization scheme

pub mod clause;
pub mod engine;
pub mod error;
pub mod index;
pub mod reasons;
pub mod search;

pub use clause::ClauseRecord;
pub use engine::{
    QueryEmbedder, RetrievalEngine, RetrievalResult, RETRIEVAL_TOP_K, SECONDARY_CAP,
};
pub use error::RetrievalError;
pub use index::EvidenceIndex;
pub use reasons::{detect_reasons, ReasonCode, SUPPORT_CONTEXT_KEYWORDS};
pub use search::{FlatIndexSearch, LinearScanSearch, NearestNeighbors};
