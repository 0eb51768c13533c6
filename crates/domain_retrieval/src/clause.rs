//! Policy clause records

use serde::{Deserialize, Serialize};

/// A single unit of policy text with its owning insurer and topic metadata.
///
/// Records are immutable once loaded and owned exclusively by the
/// [`EvidenceIndex`](crate::EvidenceIndex); the embedding vector for a record
/// lives in the index's parallel vector array, keyed by the same ordinal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClauseRecord {
    /// Owning insurer (e.g. "Acko")
    pub insurer: String,
    /// Policy category (e.g. "Two Wheeler")
    pub policy_category: String,
    /// Source document identifier
    pub doc_id: Option<String>,
    /// Clause identifier within the document
    pub clause_id: Option<String>,
    /// Clause type (exclusion, condition, ...)
    pub clause_type: Option<String>,
    /// The clause text
    pub text: String,
    /// Semantic topic label (e.g. "Topic: theft burglary housebreaking")
    pub topic_label: Option<String>,
    /// Semantic topic cluster
    pub topic_cluster_id: Option<i64>,
}
