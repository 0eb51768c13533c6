//! Query embedder backed by Ollama embeddings

use async_trait::async_trait;
use std::sync::Arc;

use core_kernel::PortError;
use domain_retrieval::QueryEmbedder;

use crate::ollama::OllamaClient;

/// Embeds retrieval queries with the Ollama embedding model.
///
/// The evidence index must have been built with the same model; a
/// dimension mismatch surfaces at query time in the retrieval engine.
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
}

impl OllamaEmbedder {
    pub fn new(client: Arc<OllamaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryEmbedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PortError> {
        self.client.embed(text).await
    }
}
