//! API configuration

use serde::Deserialize;

/// API configuration, loaded from `API_`-prefixed environment variables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Ollama daemon base URL
    pub ollama_url: String,
    /// Generation model name
    pub generation_model: String,
    /// Embedding model name (must match the evidence index build)
    pub embedding_model: String,
    /// Upper bound on LLM calls, in seconds
    pub llm_timeout_secs: u64,
    /// Image damage-model server base URL
    pub image_model_url: String,
    /// Tabular claim-model server base URL
    pub tabular_model_url: String,
    /// Upper bound on model-server calls, in seconds
    pub model_timeout_secs: u64,
    /// Directory holding the evidence index artifact
    pub evidence_index_dir: String,
    /// Log level
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/motor_claims".to_string(),
            ollama_url: "http://127.0.0.1:11434".to_string(),
            generation_model: "llama3".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            llm_timeout_secs: 120,
            image_model_url: "http://127.0.0.1:8601".to_string(),
            tabular_model_url: "http://127.0.0.1:8602".to_string(),
            model_timeout_secs: 30,
            evidence_index_dir: "rag_index".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
