//! HTTP handler for irrigation predictions

use axum::{body::Bytes, extract::State, Json};
use shared::IrrigationResult;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::irrigation::PredictInput;
use crate::AppState;

/// Predict today's irrigation amount for a crop
pub async fn predict_irrigation(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<IrrigationResult>> {
    let span = tracing::info_span!("predict", request_id = %Uuid::new_v4());

    async move {
        tracing::info!("Prediction requested ({} byte body)", body.len());
        state.irrigation.ensure_ready()?;

        let request = PredictInput::from_body(&body)?.into_request()?;
        tracing::info!(
            crop = %request.crop,
            sowing_date = %request.sowing_date,
            simulated_date = %request.simulated_date,
            "Request validated"
        );

        let result = state.irrigation.predict(&request).await?;
        Ok(Json(result))
    }
    .instrument(span)
    .await
}
