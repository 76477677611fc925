//! Service information and health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct ServiceInfo {
    pub status: &'static str,
    pub message: &'static str,
    pub required_fields: [&'static str; 3],
    pub optional_fields: [&'static str; 1],
}

/// Root endpoint describing the prediction API
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "online",
        message: "Watering calculation API. Use POST /predict",
        required_fields: ["sowing_date", "crop", "simulated_date"],
        optional_fields: ["lastWateringDate"],
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub weather_data: String,
    pub model: String,
}

fn availability(ready: bool) -> String {
    if ready { "loaded" } else { "unavailable" }.to_string()
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        weather_data: availability(state.irrigation.weather().is_ready()),
        model: availability(state.irrigation.is_ready()),
    })
}
