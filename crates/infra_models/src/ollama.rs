//! Ollama client - local LLM generation and embeddings

use serde::{Deserialize, Serialize};

use core_kernel::PortError;

use crate::http::{build_client, request_error, status_error};

/// Connection settings for the local Ollama daemon
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub generation_model: String,
    pub embedding_model: String,
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:11434".to_string(),
            generation_model: "llama3".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

/// Client for the Ollama HTTP API
pub struct OllamaClient {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self, PortError> {
        let client = build_client(config.timeout_secs)?;
        Ok(Self { client, config })
    }

    /// Checks whether the daemon answers at all
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.config.base_url);
        self.client.get(&url).send().await.is_ok()
    }

    /// Single-shot, non-streaming text generation
    pub async fn generate(&self, prompt: &str) -> Result<String, PortError> {
        let url = format!("{}/api/generate", self.config.base_url);
        let request = GenerateRequest {
            model: &self.config.generation_model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|err| request_error("ollama generate", self.config.timeout_secs, err))?;

        if !response.status().is_success() {
            return Err(status_error("ollama", response.status()));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| PortError::transformation(format!("ollama generate: {err}")))?;
        body.response
            .ok_or_else(|| PortError::transformation("ollama generate: response field missing"))
    }

    /// Embeds text with the configured embedding model
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, PortError> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let request = EmbeddingsRequest {
            model: &self.config.embedding_model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|err| request_error("ollama embeddings", self.config.timeout_secs, err))?;

        if !response.status().is_success() {
            return Err(status_error("ollama", response.status()));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|err| PortError::transformation(format!("ollama embeddings: {err}")))?;
        Ok(body.embedding)
    }
}
