//! Motor Claims Core - API Server Binary
//!
//! Starts the HTTP API server for the claims adjudication pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 API_DATABASE_URL=postgres://... cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` / `API_PORT` - bind address (default: 0.0.0.0:8080)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_OLLAMA_URL` - Ollama daemon base URL
//! * `API_GENERATION_MODEL` / `API_EMBEDDING_MODEL` - Ollama model names
//! * `API_IMAGE_MODEL_URL` / `API_TABULAR_MODEL_URL` - model server URLs
//! * `API_EVIDENCE_INDEX_DIR` - evidence index artifact directory
//! * `API_LOG_LEVEL` - trace, debug, info, warn, error (default: info)

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_claims::ClaimProcessor;
use domain_retrieval::RetrievalEngine;
use infra_db::{create_pool, run_migrations, ClaimsRepository, DatabaseConfig};
use infra_models::{
    HttpImageAnalyzer, HttpTabularPredictor, OllamaClient, OllamaConfig, OllamaEmbedder,
    OllamaExplanationGenerator, OllamaKeywordExtractor,
};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Motor Claims API Server"
    );

    let pool = create_pool(&DatabaseConfig {
        url: config.database_url.clone(),
        ..DatabaseConfig::default()
    })
    .await
    .context("failed to connect to database")?;
    run_migrations(&pool).await.context("failed to run migrations")?;

    let ollama = Arc::new(OllamaClient::new(OllamaConfig {
        base_url: config.ollama_url.clone(),
        generation_model: config.generation_model.clone(),
        embedding_model: config.embedding_model.clone(),
        timeout_secs: config.llm_timeout_secs,
    })?);
    if !ollama.is_available().await {
        tracing::warn!(
            url = %config.ollama_url,
            "ollama is not reachable; keyword extraction and explanations will degrade"
        );
    }

    let retrieval = Arc::new(RetrievalEngine::new(
        config.evidence_index_dir.clone(),
        Arc::new(OllamaEmbedder::new(ollama.clone())),
    ));
    let image_analyzer = Arc::new(HttpImageAnalyzer::new(
        config.image_model_url.clone(),
        config.model_timeout_secs,
    )?);
    let tabular = Arc::new(HttpTabularPredictor::new(
        config.tabular_model_url.clone(),
        config.model_timeout_secs,
    )?);
    let keyword_extractor = Arc::new(OllamaKeywordExtractor::new(ollama.clone()));
    let explainer = Arc::new(OllamaExplanationGenerator::new(ollama));

    let store = Arc::new(ClaimsRepository::new(pool));
    let processor = Arc::new(ClaimProcessor::new(
        image_analyzer,
        keyword_extractor,
        retrieval,
        tabular,
        explainer,
        store.clone(),
    ));

    let app = create_router(AppState { processor, store });

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .context("invalid server address")?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown signal handler");
        return;
    }
    tracing::info!("Shutdown signal received");
}
