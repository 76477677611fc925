//! Irrigation request and result models

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::Crop;
use crate::features::WeatherAggregates;
use crate::types::days_between;
use crate::validation::{validate_date_order, DateError};

/// Unit label reported alongside the water amount
pub const WATER_UNIT: &str = "mm (≈ liters per m²)";

/// A validated irrigation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrigationRequest {
    pub sowing_date: NaiveDate,
    pub simulated_date: NaiveDate,
    pub last_watering_date: Option<NaiveDate>,
    pub crop: Crop,
}

impl IrrigationRequest {
    /// Create a request, rejecting dates that would make a day counter negative
    pub fn new(
        sowing_date: NaiveDate,
        simulated_date: NaiveDate,
        last_watering_date: Option<NaiveDate>,
        crop: Crop,
    ) -> Result<Self, DateError> {
        validate_date_order(sowing_date, simulated_date, last_watering_date)?;
        Ok(Self {
            sowing_date,
            simulated_date,
            last_watering_date,
            crop,
        })
    }

    pub fn days_since_sowing(&self) -> i64 {
        days_between(self.sowing_date, self.simulated_date)
    }

    /// Days since the last recorded watering; with no record, the whole
    /// season since sowing counts as unwatered.
    pub fn days_since_last_water(&self) -> i64 {
        match self.last_watering_date {
            Some(watering) => days_between(watering, self.simulated_date),
            None => self.days_since_sowing(),
        }
    }
}

/// Names of the model inputs, in the order the model was trained on
pub const FEATURE_NAMES: [&str; FeatureVector::LEN] = [
    "temp_avg",
    "et0",
    "precip_7d",
    "wind",
    "soil_moisture",
    "days_since",
    "days_since_last_water",
    "crop",
];

/// Fixed-order model input. Reordering positions breaks the trained model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FeatureVector::LEN]);

impl FeatureVector {
    pub const LEN: usize = 8;

    pub fn new(weather: &WeatherAggregates, days_since: i64, days_since_last_water: i64, crop: Crop) -> Self {
        Self([
            weather.avg_temp,
            weather.et0,
            weather.precip_7d,
            weather.wind,
            weather.soil_moisture,
            days_since as f64,
            days_since_last_water as f64,
            f64::from(crop.code()),
        ])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn values(&self) -> [f64; FeatureVector::LEN] {
        self.0
    }

}

/// Crop phenological phases
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GrowthPhase {
    Germination,
    #[serde(rename = "Seedling stage")]
    SeedlingStage,
    #[serde(rename = "Vegetative stage")]
    VegetativeStage,
    #[serde(rename = "Stem elongation")]
    StemElongation,
    Flowering,
    #[serde(rename = "Grain filling")]
    GrainFilling,
    Maturation,
}

impl GrowthPhase {
    pub fn label(self) -> &'static str {
        match self {
            GrowthPhase::Germination => "Germination",
            GrowthPhase::SeedlingStage => "Seedling stage",
            GrowthPhase::VegetativeStage => "Vegetative stage",
            GrowthPhase::StemElongation => "Stem elongation",
            GrowthPhase::Flowering => "Flowering",
            GrowthPhase::GrainFilling => "Grain filling",
            GrowthPhase::Maturation => "Maturation",
        }
    }
}

impl std::fmt::Display for GrowthPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classified growth phase with its heat-accumulation inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseEstimate {
    pub phase: GrowthPhase,
    /// Approximate growing degree days since sowing
    pub gdd: f64,
    /// Fraction of the crop's GDD-to-maturity reached, in [0, 1]
    pub progress: f64,
}

/// Everything the explanation text is allowed to talk about
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplanationContext {
    pub crop: Crop,
    pub days_since: i64,
    pub days_since_last_water: i64,
    pub weather: WeatherAggregates,
    pub predicted_mm: f64,
}

/// Response body of a successful prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationResult {
    pub water_mm: f64,
    pub unit: String,
    pub phase_progress: f64,
    pub phase_name: GrowthPhase,
    pub explanation: String,
    pub calculation_date: NaiveDate,
    pub crop: Crop,
    pub days_since: i64,
    pub days_since_last_water: i64,
}

impl IrrigationResult {
    pub fn new(
        request: &IrrigationRequest,
        phase: &PhaseEstimate,
        predicted_mm: f64,
        explanation: String,
    ) -> Self {
        Self {
            water_mm: round_half_even(predicted_mm, 1),
            unit: WATER_UNIT.to_string(),
            phase_progress: round_half_even(phase.progress, 2).clamp(0.0, 1.0),
            phase_name: phase.phase,
            explanation,
            calculation_date: request.simulated_date,
            crop: request.crop,
            days_since: request.days_since_sowing(),
            days_since_last_water: request.days_since_last_water(),
        }
    }
}

/// Round to `dp` decimals, exact binary ties to even. Non-finite values pass through.
pub fn round_half_even(value: f64, dp: u32) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}
