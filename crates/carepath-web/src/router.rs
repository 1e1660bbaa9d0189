//! Axum router — maps all URL paths to handlers.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{classifier, health::healthz, triage};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Rule-based engine
        .route("/triage/recommendations", post(triage::recommendations))
        .route("/triage/vocab",           get(triage::vocab))

        // Classifier
        .route("/triage/classifier",        post(classifier::predict))
        .route("/triage/classifier/advice", post(classifier::advice))
        .route("/triage/classifier/vocab",  get(classifier::vocab))

        .route("/healthz", get(healthz))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
