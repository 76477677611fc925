//! Irrigation model
//!
//! The regressor is trained offline and persisted as a JSON document holding
//! its feature names, intercept and coefficients. The server only scores.

use std::path::Path;

use serde::Deserialize;
use shared::{FeatureVector, FEATURE_NAMES};

use crate::error::{AppError, AppResult};

/// Black-box regressor producing millimetres of water from a feature vector
pub trait Oracle: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> AppResult<f64>;
}

/// Persisted model document
#[derive(Debug, Deserialize)]
struct ModelDocument {
    feature_names: Vec<String>,
    intercept: f64,
    coefficients: Vec<f64>,
}

/// Linear irrigation model
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    intercept: f64,
    coefficients: [f64; FeatureVector::LEN],
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: [f64; FeatureVector::LEN]) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    /// Load and validate a model document from disk
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read model {}: {}", path.display(), e))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let document: ModelDocument = serde_json::from_str(raw)?;

        if document.feature_names.len() != FeatureVector::LEN
            || document.coefficients.len() != FeatureVector::LEN
        {
            anyhow::bail!(
                "model expects {} features ({} coefficients), server provides {}",
                document.feature_names.len(),
                document.coefficients.len(),
                FeatureVector::LEN
            );
        }
        if let Some((i, (found, expected))) = document
            .feature_names
            .iter()
            .zip(FEATURE_NAMES.iter())
            .enumerate()
            .find(|(_, (found, expected))| found.as_str() != **expected)
        {
            anyhow::bail!(
                "feature order mismatch at position {}: model has '{}', server sends '{}'",
                i,
                found,
                expected
            );
        }
        if !document.intercept.is_finite() || document.coefficients.iter().any(|c| !c.is_finite()) {
            anyhow::bail!("model contains non-finite parameters");
        }

        let mut coefficients = [0.0; FeatureVector::LEN];
        coefficients.copy_from_slice(&document.coefficients);
        Ok(Self::new(document.intercept, coefficients))
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

impl Oracle for LinearModel {
    fn predict(&self, features: &FeatureVector) -> AppResult<f64> {
        let raw = features
            .as_slice()
            .iter()
            .zip(self.coefficients.iter())
            .fold(self.intercept, |acc, (x, w)| acc + x * w);

        if !raw.is_finite() {
            return Err(AppError::Model(format!(
                "non-finite prediction for features {:?}",
                features.values()
            )));
        }
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Crop, WeatherAggregates};

    const DOCUMENT: &str = r#"{
        "feature_names": ["temp_avg", "et0", "precip_7d", "wind", "soil_moisture",
                          "days_since", "days_since_last_water", "crop"],
        "intercept": 1.0,
        "coefficients": [0.1, 0.8, -0.75, 0.05, -25.0, 0.02, 0.3, 0.5]
    }"#;

    fn features() -> FeatureVector {
        FeatureVector::new(&WeatherAggregates::default(), 10, 10, Crop::Maize)
    }

    #[test]
    fn test_load_and_predict() {
        let model = LinearModel::from_json(DOCUMENT).unwrap();
        assert_eq!(model.n_features(), 8);
        // 1 + 2.5 + 4.0 + 0 + 0.15 - 6.25 + 0.2 + 3.0 + 0
        let predicted = model.predict(&features()).unwrap();
        assert!((predicted - 4.6).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_is_returned_unchanged() {
        let model = LinearModel::new(-1.5, [0.0; 8]);
        assert_eq!(model.predict(&features()).unwrap(), -1.5);
    }

    #[test]
    fn test_rejects_reordered_features() {
        let swapped = DOCUMENT.replace(
            r#""temp_avg", "et0""#,
            r#""et0", "temp_avg""#,
        );
        let err = LinearModel::from_json(&swapped).unwrap_err();
        assert!(err.to_string().contains("position 0"));
    }

    #[test]
    fn test_rejects_wrong_feature_count() {
        let short = r#"{"feature_names": ["temp_avg"], "intercept": 0.0, "coefficients": [1.0]}"#;
        assert!(LinearModel::from_json(short).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(LinearModel::load("/nonexistent/irrigation_model.json").is_err());
    }
}
