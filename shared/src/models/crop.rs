//! Crop models

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported crops. The wire format carries the integer code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    Maize,
    Wheat,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CropError {
    #[error("Unknown crop code {0} (expected 0 = maize or 1 = wheat)")]
    UnknownCode(i64),
}

impl Crop {
    pub const ALL: [Crop; 2] = [Crop::Maize, Crop::Wheat];

    pub fn from_code(code: i64) -> Result<Self, CropError> {
        match code {
            0 => Ok(Crop::Maize),
            1 => Ok(Crop::Wheat),
            other => Err(CropError::UnknownCode(other)),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Crop::Maize => 0,
            Crop::Wheat => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Crop::Maize => "maize",
            Crop::Wheat => "wheat",
        }
    }

    /// Base temperature (°C) below which no growing degree days accumulate
    pub fn base_temperature_c(self) -> f64 {
        match self {
            Crop::Maize => 10.0,
            Crop::Wheat => 4.0,
        }
    }

    /// Growing degree days from sowing to physiological maturity
    pub fn gdd_to_maturity(self) -> f64 {
        match self {
            Crop::Maize => 1800.0,
            Crop::Wheat => 1600.0,
        }
    }

    /// Days after sowing before the crop can leave its first phase
    pub fn establishment_days(self) -> i64 {
        match self {
            Crop::Maize => 10,
            Crop::Wheat => 20,
        }
    }
}

impl TryFrom<i64> for Crop {
    type Error = CropError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Crop::from_code(code)
    }
}

impl std::fmt::Display for Crop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_codes() {
        assert_eq!(Crop::from_code(0), Ok(Crop::Maize));
        assert_eq!(Crop::from_code(1), Ok(Crop::Wheat));
        assert_eq!(Crop::from_code(2), Err(CropError::UnknownCode(2)));
        assert_eq!(Crop::try_from(-1), Err(CropError::UnknownCode(-1)));
        for crop in Crop::ALL {
            assert_eq!(Crop::from_code(crop.code() as i64), Ok(crop));
        }
    }

    #[test]
    fn test_crop_serializes_as_name() {
        assert_eq!(serde_json::to_string(&Crop::Maize).unwrap(), "\"maize\"");
        assert_eq!(Crop::Wheat.to_string(), "wheat");
    }
}
