//! Retrieval error types

use core_kernel::PortError;
use thiserror::Error;

/// Errors raised while loading or querying the evidence index
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The artifact directory or one of its files is unusable
    #[error("Evidence index artifact error: {0}")]
    Artifact(String),

    /// An artifact file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Clause metadata could not be parsed
    #[error("Malformed clause metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// The query vector does not match the index dimension
    #[error("Embedding dimension mismatch: index has {expected}, query has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The embedding collaborator failed
    #[error("Query embedding failed: {0}")]
    Embedding(#[from] PortError),
}

impl RetrievalError {
    pub fn artifact(message: impl Into<String>) -> Self {
        RetrievalError::Artifact(message.into())
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        RetrievalError::Io {
            path: path.into(),
            source,
        }
    }
}
