//! Risk prediction passthrough.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{HealthRecord, PartialHealthRecord, PredictionSource};

#[derive(Serialize)]
pub struct PredictResponse {
    pub cvd_probability_percent: f64,
    pub source: PredictionSource,
}

/// `POST /api/predict`: the partial record is merged over the form
/// defaults before scoring. Never fails on upstream errors.
pub async fn predict(
    State(ctx): State<ApiContext>,
    payload: Result<Json<PartialHealthRecord>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(partial) = payload?;
    let record = HealthRecord::with_defaults(&partial);
    let prediction = ctx.predictor.predict(&record).await;
    Ok(Json(PredictResponse {
        cvd_probability_percent: prediction.risk_percentage,
        source: prediction.source,
    }))
}
