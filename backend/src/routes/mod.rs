//! Route definitions for the Smart Irrigation Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Irrigation prediction
        .route("/predict", post(handlers::predict_irrigation))
        // Site assistant
        .route("/chat", post(handlers::chat))
}
