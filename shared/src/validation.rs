//! Validation utilities for irrigation requests
//!
//! Dates on the wire are strict `YYYY-MM-DD` strings. Ordering rules keep
//! every day counter non-negative.

use chrono::NaiveDate;
use thiserror::Error;

/// Date parsing and ordering failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid date format for {field}: '{value}' (expected YYYY-MM-DD)")]
    Format { field: String, value: String },

    #[error("sowing_date ({sowing}) is later than simulated_date ({simulated})")]
    SowingAfterSimulated {
        sowing: NaiveDate,
        simulated: NaiveDate,
    },

    #[error("lastWateringDate ({watering}) is later than simulated_date ({simulated})")]
    WateringAfterSimulated {
        watering: NaiveDate,
        simulated: NaiveDate,
    },
}

impl DateError {
    /// Name of the request field the error refers to
    pub fn field(&self) -> &str {
        match self {
            DateError::Format { field, .. } => field,
            DateError::SowingAfterSimulated { .. } => "sowing_date",
            DateError::WateringAfterSimulated { .. } => "lastWateringDate",
        }
    }

    pub fn is_ordering(&self) -> bool {
        !matches!(self, DateError::Format { .. })
    }
}

/// Check the `DDDD-DD-DD` shape before handing off to chrono, which would
/// otherwise accept unpadded months and days.
fn has_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parse a strict `YYYY-MM-DD` date for the named request field
pub fn parse_iso_date(field: &str, value: &str) -> Result<NaiveDate, DateError> {
    let format_error = || DateError::Format {
        field: field.to_string(),
        value: value.to_string(),
    };

    if !has_iso_date_shape(value) {
        return Err(format_error());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| format_error())
}

/// Validate that neither sowing nor last watering happens after the simulated date
pub fn validate_date_order(
    sowing: NaiveDate,
    simulated: NaiveDate,
    last_watering: Option<NaiveDate>,
) -> Result<(), DateError> {
    if simulated < sowing {
        return Err(DateError::SowingAfterSimulated { sowing, simulated });
    }
    if let Some(watering) = last_watering {
        if simulated < watering {
            return Err(DateError::WateringAfterSimulated {
                watering,
                simulated,
            });
        }
    }
    Ok(())
}
