//! WebAssembly module for the Smart Irrigation Platform
//!
//! Provides client-side computation for:
//! - Growth phase previews
//! - Day counting between form dates
//! - Form date validation before submitting a prediction

use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::{classify_phase, parse_iso_date, round_half_even, validate_date_order, Crop};

#[derive(Debug, Serialize)]
struct PhasePreview {
    phase_name: &'static str,
    phase_progress: f64,
}

fn phase_preview(crop: u8, days_since: i64, avg_temp: f64) -> Result<String, String> {
    let crop = Crop::from_code(i64::from(crop)).map_err(|e| e.to_string())?;
    let estimate = classify_phase(crop, days_since, avg_temp);

    serde_json::to_string(&PhasePreview {
        phase_name: estimate.phase.label(),
        phase_progress: round_half_even(estimate.progress, 2),
    })
    .map_err(|e| e.to_string())
}

fn count_days(from: &str, to: &str) -> Result<i64, String> {
    let from = parse_iso_date("from", from).map_err(|e| e.to_string())?;
    let to = parse_iso_date("to", to).map_err(|e| e.to_string())?;
    Ok(shared::days_between(from, to))
}

fn check_dates(sowing: &str, simulated: &str, last_watering: Option<&str>) -> Result<(), String> {
    let sowing = parse_iso_date("sowing_date", sowing).map_err(|e| e.to_string())?;
    let simulated = parse_iso_date("simulated_date", simulated).map_err(|e| e.to_string())?;
    let last_watering = last_watering
        .filter(|s| !s.is_empty())
        .map(|s| parse_iso_date("lastWateringDate", s))
        .transpose()
        .map_err(|e| e.to_string())?;

    validate_date_order(sowing, simulated, last_watering).map_err(|e| e.to_string())
}

/// Preview the growth phase as `{"phase_name", "phase_progress"}` JSON
#[wasm_bindgen]
pub fn classify_growth_phase(crop: u8, days_since: i64, avg_temp: f64) -> Result<String, JsValue> {
    phase_preview(crop, days_since, avg_temp).map_err(|e| JsValue::from_str(&e))
}

/// Whole days from `from` to `to` (negative when `to` is earlier)
#[wasm_bindgen]
pub fn days_between(from: &str, to: &str) -> Result<i64, JsValue> {
    count_days(from, to).map_err(|e| JsValue::from_str(&e))
}

/// Validate the prediction form dates; the error carries the server's message
#[wasm_bindgen]
pub fn validate_request_dates(
    sowing: &str,
    simulated: &str,
    last_watering: Option<String>,
) -> Result<(), JsValue> {
    check_dates(sowing, simulated, last_watering.as_deref()).map_err(|e| JsValue::from_str(&e))
}
