//! Weather data models
//!
//! The source dataset is sub-daily (hourly Open-Meteo exports). Readings are
//! kept as loaded and aggregated to one logical day on lookup: continuous
//! quantities are averaged over non-null cells, precipitation is summed.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::DateRange;

/// Conversion factor from km/h (source unit) to m/s
pub const KMH_TO_MPS: f64 = 1.0 / 3.6;

/// One raw row of the weather dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub timestamp: NaiveDateTime,
    pub temperature_c: Option<f64>,
    pub et0_mm: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub precipitation_mm: Option<f64>,
}

impl WeatherReading {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Daily aggregate of all readings sharing a calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub date: NaiveDate,
    pub avg_temperature_c: Option<f64>,
    pub et0_mm: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub soil_moisture: Option<f64>,
    pub precipitation_mm: f64,
}

fn mean(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn total(values: impl Iterator<Item = Option<f64>>) -> f64 {
    values.flatten().filter(|v| v.is_finite()).sum()
}

impl WeatherObservation {
    /// Aggregate the readings of one day. Returns None for an empty slice.
    pub fn aggregate(date: NaiveDate, readings: &[WeatherReading]) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }
        Some(Self {
            date,
            avg_temperature_c: mean(readings.iter().map(|r| r.temperature_c)),
            et0_mm: mean(readings.iter().map(|r| r.et0_mm)),
            wind_speed_mps: mean(readings.iter().map(|r| r.wind_speed_mps)),
            soil_moisture: mean(readings.iter().map(|r| r.soil_moisture)),
            precipitation_mm: total(readings.iter().map(|r| r.precipitation_mm)),
        })
    }
}

/// Read-only, date-indexed table of weather readings
#[derive(Debug, Clone, Default)]
pub struct WeatherTable {
    days: BTreeMap<NaiveDate, Vec<WeatherReading>>,
    readings: usize,
}

impl WeatherTable {
    pub fn from_readings(readings: impl IntoIterator<Item = WeatherReading>) -> Self {
        let mut days: BTreeMap<NaiveDate, Vec<WeatherReading>> = BTreeMap::new();
        let mut count = 0;
        for reading in readings {
            days.entry(reading.date()).or_default().push(reading);
            count += 1;
        }
        for rows in days.values_mut() {
            rows.sort_by_key(|r| r.timestamp);
        }
        Self {
            days,
            readings: count,
        }
    }

    /// Raw readings recorded on `date` (empty when the date is not covered)
    pub fn lookup_day(&self, date: NaiveDate) -> &[WeatherReading] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Raw readings within the inclusive range
    pub fn lookup_range(&self, range: DateRange) -> impl Iterator<Item = &WeatherReading> + '_ {
        let rows = if range.start <= range.end {
            Some(self.days.range(range.start..=range.end))
        } else {
            None
        };
        rows.into_iter().flatten().flat_map(|(_, rows)| rows.iter())
    }

    /// Aggregated observation for one day
    pub fn daily(&self, date: NaiveDate) -> Option<WeatherObservation> {
        WeatherObservation::aggregate(date, self.lookup_day(date))
    }

    /// Total precipitation over the inclusive range
    pub fn precipitation_total(&self, range: DateRange) -> f64 {
        total(self.lookup_range(range).map(|r| r.precipitation_mm))
    }

    /// First and last covered dates
    pub fn coverage(&self) -> Option<DateRange> {
        let first = *self.days.keys().next()?;
        let last = *self.days.keys().next_back()?;
        Some(DateRange::new(first, last))
    }

    /// Number of raw readings
    pub fn len(&self) -> usize {
        self.readings
    }

    pub fn is_empty(&self) -> bool {
        self.readings == 0
    }

    /// Number of distinct dates
    pub fn day_count(&self) -> usize {
        self.days.len()
    }
}
