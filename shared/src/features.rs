//! Feature derivation for the irrigation model
//!
//! Joins the weather table against the simulated date and assembles the
//! fixed-order feature vector. When the date has no readings (or no table is
//! loaded at all) the whole weather tuple falls back to climate defaults at
//! once; a single column only falls back on its own when that column holds no
//! usable values for an otherwise covered day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{FeatureVector, IrrigationRequest, WeatherTable};
use crate::types::DateRange;

pub const DEFAULT_AVG_TEMP_C: f64 = 25.0;
pub const DEFAULT_ET0_MM: f64 = 5.0;
pub const DEFAULT_PRECIP_7D_MM: f64 = 0.0;
pub const DEFAULT_WIND_MPS: f64 = 3.0;
pub const DEFAULT_SOIL_MOISTURE: f64 = 0.25;

/// Length of the trailing precipitation window, simulated date included
pub const PRECIP_WINDOW_DAYS: i64 = 7;

/// Weather inputs for one simulated date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherAggregates {
    pub avg_temp: f64,
    pub et0: f64,
    pub precip_7d: f64,
    pub wind: f64,
    pub soil_moisture: f64,
}

impl Default for WeatherAggregates {
    fn default() -> Self {
        Self {
            avg_temp: DEFAULT_AVG_TEMP_C,
            et0: DEFAULT_ET0_MM,
            precip_7d: DEFAULT_PRECIP_7D_MM,
            wind: DEFAULT_WIND_MPS,
            soil_moisture: DEFAULT_SOIL_MOISTURE,
        }
    }
}

/// Where the weather aggregates came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSource {
    Observed,
    DateNotFound,
    TableUnavailable,
}

impl WeatherSource {
    pub fn is_default(self) -> bool {
        self != WeatherSource::Observed
    }
}

/// Resolve the weather aggregates for `date`
pub fn resolve_weather(
    table: Option<&WeatherTable>,
    date: NaiveDate,
) -> (WeatherAggregates, WeatherSource) {
    let Some(table) = table else {
        return (WeatherAggregates::default(), WeatherSource::TableUnavailable);
    };
    // The trailing window is only consulted once the day itself is covered
    let Some(day) = table.daily(date) else {
        return (WeatherAggregates::default(), WeatherSource::DateNotFound);
    };

    let defaults = WeatherAggregates::default();
    let aggregates = WeatherAggregates {
        avg_temp: day.avg_temperature_c.unwrap_or(defaults.avg_temp),
        et0: day.et0_mm.unwrap_or(defaults.et0),
        precip_7d: table.precipitation_total(DateRange::trailing(date, PRECIP_WINDOW_DAYS)),
        wind: day.wind_speed_mps.unwrap_or(defaults.wind),
        soil_moisture: day.soil_moisture.unwrap_or(defaults.soil_moisture),
    };
    (aggregates, WeatherSource::Observed)
}

/// Output of the feature deriver
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedFeatures {
    pub weather: WeatherAggregates,
    pub weather_source: WeatherSource,
    pub days_since: i64,
    pub days_since_last_water: i64,
    pub vector: FeatureVector,
}

/// Build the model inputs for a validated request
pub fn derive_features(request: &IrrigationRequest, table: Option<&WeatherTable>) -> DerivedFeatures {
    let (weather, weather_source) = resolve_weather(table, request.simulated_date);
    let days_since = request.days_since_sowing();
    let days_since_last_water = request.days_since_last_water();

    DerivedFeatures {
        weather,
        weather_source,
        days_since,
        days_since_last_water,
        vector: FeatureVector::new(&weather, days_since, days_since_last_water, request.crop),
    }
}
