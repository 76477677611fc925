//! Error handling for the Smart Irrigation server
//!
//! Every error response carries a human-readable `error` string plus a
//! machine-readable `code` so clients can tell the validation cases apart.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{CropError, DateError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Request body must be a JSON object")]
    MissingBody,

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidFormat { field: String, message: String },

    #[error(transparent)]
    Date(#[from] DateError),

    #[error(transparent)]
    Crop(#[from] CropError),

    // Service availability
    #[error("Irrigation model is not loaded")]
    ModelUnavailable,

    #[error("Model error: {0}")]
    Model(String),

    // External service errors
    #[error("Explanation service error: {0}")]
    ExplanationService(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn missing_field(field: &str) -> Self {
        AppError::MissingField {
            field: field.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingBody
            | AppError::MissingField { .. }
            | AppError::InvalidFormat { .. }
            | AppError::Date(_)
            | AppError::Crop(_) => StatusCode::BAD_REQUEST,
            AppError::ExplanationService(_) => StatusCode::BAD_GATEWAY,
            AppError::ModelUnavailable
            | AppError::Model(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> ErrorResponse {
        let (code, field) = match self {
            AppError::MissingBody => ("MISSING_BODY", None),
            AppError::MissingField { field } => ("MISSING_FIELD", Some(field.clone())),
            AppError::InvalidFormat { field, .. } => ("INVALID_FORMAT", Some(field.clone())),
            AppError::Date(err) if err.is_ordering() => {
                ("INVALID_DATE_ORDER", Some(err.field().to_string()))
            }
            AppError::Date(err) => ("INVALID_FORMAT", Some(err.field().to_string())),
            AppError::Crop(_) => ("INVALID_CROP", Some("crop".to_string())),
            AppError::ModelUnavailable => ("MODEL_UNAVAILABLE", None),
            AppError::ExplanationService(_) => ("EXPLANATION_SERVICE_ERROR", None),
            AppError::Model(_)
            | AppError::Configuration(_)
            | AppError::Internal(_) => ("INTERNAL_ERROR", None),
        };

        // Client faults echo their message; server faults stay generic
        let error = match self.status() {
            StatusCode::BAD_REQUEST => self.to_string(),
            _ if matches!(self, AppError::ModelUnavailable) => self.to_string(),
            _ => "An internal server error occurred".to_string(),
        };

        ErrorResponse { error, code, field }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        (status, Json(self.detail())).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
