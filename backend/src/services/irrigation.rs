//! Irrigation service: validates requests and orchestrates a prediction
//!
//! Flow per request: features and growth phase are derived from the dates and
//! the weather table, the model scores the features, and the explainer
//! narrates the result. Only the model is mandatory; a failing explainer
//! degrades to a placeholder text.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use shared::{
    classify_phase, derive_features, parse_iso_date, Crop, DateError, ExplanationContext,
    IrrigationRequest, IrrigationResult, WeatherSource,
};

use crate::error::{AppError, AppResult};
use crate::external::{Explainer, Oracle, EXPLANATION_PLACEHOLDER};
use crate::services::weather::WeatherService;

/// Raw `/predict` body. Fields stay untyped so each problem can be reported
/// precisely instead of as a generic deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct PredictInput {
    pub sowing_date: Option<Value>,
    pub simulated_date: Option<Value>,
    pub crop: Option<Value>,
    #[serde(rename = "lastWateringDate")]
    pub last_watering_date: Option<Value>,
}

impl PredictInput {
    /// Parse the request body; anything but a JSON object counts as missing
    pub fn from_body(body: &[u8]) -> AppResult<Self> {
        let value: Value = serde_json::from_slice(body).map_err(|_| AppError::MissingBody)?;
        if !value.is_object() {
            return Err(AppError::MissingBody);
        }
        serde_json::from_value(value).map_err(|_| AppError::MissingBody)
    }

    /// Validate fields and date ordering
    pub fn into_request(self) -> AppResult<IrrigationRequest> {
        let simulated = required_date("simulated_date", self.simulated_date)?;
        let sowing = required_date("sowing_date", self.sowing_date)?;
        let last_watering = optional_date("lastWateringDate", self.last_watering_date)?;
        let crop = crop_from_value(self.crop)?;

        Ok(IrrigationRequest::new(sowing, simulated, last_watering, crop)?)
    }
}

fn date_from_value(field: &str, value: Value) -> AppResult<Option<NaiveDate>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(parse_iso_date(field, &s)?)),
        other => Err(DateError::Format {
            field: field.to_string(),
            value: other.to_string(),
        }
        .into()),
    }
}

fn required_date(field: &str, value: Option<Value>) -> AppResult<NaiveDate> {
    date_from_value(field, value.unwrap_or(Value::Null))?
        .ok_or_else(|| AppError::missing_field(field))
}

fn optional_date(field: &str, value: Option<Value>) -> AppResult<Option<NaiveDate>> {
    date_from_value(field, value.unwrap_or(Value::Null))
}

fn crop_from_value(value: Option<Value>) -> AppResult<Crop> {
    let invalid = || AppError::InvalidFormat {
        field: "crop".to_string(),
        message: "expected integer 0 (maize) or 1 (wheat)".to_string(),
    };

    match value {
        None | Some(Value::Null) => Err(AppError::missing_field("crop")),
        Some(Value::Number(n)) => {
            let code = match (n.as_i64(), n.as_f64()) {
                (Some(code), _) => code,
                (None, Some(f)) if f.is_finite() && f.fract() == 0.0 => f as i64,
                _ => return Err(invalid()),
            };
            Ok(Crop::from_code(code)?)
        }
        Some(_) => Err(invalid()),
    }
}

/// Orchestrates feature derivation, scoring and explanation
pub struct IrrigationService {
    weather: Arc<WeatherService>,
    oracle: Option<Arc<dyn Oracle>>,
    explainer: Arc<dyn Explainer>,
    explain_timeout: Duration,
}

impl IrrigationService {
    pub fn new(
        weather: Arc<WeatherService>,
        oracle: Option<Arc<dyn Oracle>>,
        explainer: Arc<dyn Explainer>,
        explain_timeout: Duration,
    ) -> Self {
        Self {
            weather,
            oracle,
            explainer,
            explain_timeout,
        }
    }

    /// Whether the model is loaded
    pub fn is_ready(&self) -> bool {
        self.oracle.is_some()
    }

    pub fn weather(&self) -> &WeatherService {
        &self.weather
    }

    fn oracle(&self) -> AppResult<&dyn Oracle> {
        self.oracle.as_deref().ok_or(AppError::ModelUnavailable)
    }

    /// Fail fast before any request work when the model is missing
    pub fn ensure_ready(&self) -> AppResult<()> {
        self.oracle().map(|_| ())
    }

    /// Compute the irrigation recommendation for a validated request
    pub async fn predict(&self, request: &IrrigationRequest) -> AppResult<IrrigationResult> {
        let oracle = self.oracle()?;

        let derived = derive_features(request, self.weather.table());
        match derived.weather_source {
            WeatherSource::Observed => tracing::debug!(
                "Weather for {}: T={:.1}°C, ET0={:.1}, Precip7d={:.1}mm",
                request.simulated_date,
                derived.weather.avg_temp,
                derived.weather.et0,
                derived.weather.precip_7d
            ),
            WeatherSource::DateNotFound => tracing::info!(
                "No weather data for {}, using default climate values",
                request.simulated_date
            ),
            WeatherSource::TableUnavailable => {
                tracing::info!("Weather data not loaded, using default climate values")
            }
        }

        let phase = classify_phase(request.crop, derived.days_since, derived.weather.avg_temp);

        let predicted_mm = oracle.predict(&derived.vector)?;
        tracing::debug!(
            features = ?derived.vector.values(),
            predicted_mm,
            phase = %phase.phase,
            "Model scored request"
        );

        let context = ExplanationContext {
            crop: request.crop,
            days_since: derived.days_since,
            days_since_last_water: derived.days_since_last_water,
            weather: derived.weather,
            predicted_mm,
        };
        let explanation = self.explain(&context).await;

        Ok(IrrigationResult::new(request, &phase, predicted_mm, explanation))
    }

    /// Narrate the result, substituting the placeholder on error or timeout
    async fn explain(&self, context: &ExplanationContext) -> String {
        match tokio::time::timeout(self.explain_timeout, self.explainer.explain(context)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                tracing::warn!("Explanation failed: {}", e);
                EXPLANATION_PLACEHOLDER.to_string()
            }
            Err(_) => {
                tracing::warn!(
                    "Explanation timed out after {}s",
                    self.explain_timeout.as_secs_f32()
                );
                EXPLANATION_PLACEHOLDER.to_string()
            }
        }
    }
}
