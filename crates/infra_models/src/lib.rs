//! Model Collaborator Adapters
//!
//! HTTP implementations of the collaborator ports: the Ollama-backed LLM
//! client (text generation and query embeddings), the keyword extractor and
//! explanation generator built on it, and the image/tabular model-server
//! clients. Adapters are constructed once at startup and shared; they hold
//! no per-request state and are safe for concurrent use.

pub mod embedding;
pub mod explanation;
mod http;
pub mod image;
pub mod keywords;
pub mod ollama;
pub mod tabular;

pub use embedding::OllamaEmbedder;
pub use explanation::OllamaExplanationGenerator;
pub use image::HttpImageAnalyzer;
pub use keywords::OllamaKeywordExtractor;
pub use ollama::{OllamaClient, OllamaConfig};
pub use tabular::HttpTabularPredictor;
