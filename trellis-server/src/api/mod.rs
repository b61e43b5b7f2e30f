//! API Module
//!
//! HTTP API layer over the engine gateway.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod health;
pub mod job;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use trellis_engine::gateway::Gateway;

/// Create the main API router with all endpoints
pub fn create_router(gateway: Gateway) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Pipeline endpoints
        .route("/pipeline/submit", post(job::submit_pipeline))
        // Job endpoints
        .route("/job/{id}", get(job::get_job))
        .route("/job/{id}/cancel", post(job::cancel_job))
        .route("/jobs", get(job::list_jobs))
        // Add state and middleware
        .with_state(gateway)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
