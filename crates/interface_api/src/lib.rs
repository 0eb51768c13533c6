//! HTTP API Layer
//!
//! Thin Axum surface over the claims pipeline: submit a claim, read a claim
//! with its latest explanation, list recent claims. Authentication, file
//! upload, and analytics are out of scope; image references arrive as
//! opaque strings.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_claims::{ClaimProcessor, ClaimStore};

use crate::handlers::{claims, health};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<ClaimProcessor>,
    pub store: Arc<dyn ClaimStore>,
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let claims_routes = Router::new()
        .route("/", post(claims::submit_claim).get(claims::list_claims))
        .route("/:id", get(claims::get_claim));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/claims", claims_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
