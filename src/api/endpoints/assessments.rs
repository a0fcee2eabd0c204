//! Assessment endpoints:
//! - `POST /api/assessments`: predict, classify, store
//! - `GET /api/assessments`: newest-first history
//! - `GET /api/assessments/latest`
//! - `DELETE /api/assessments`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::{clear_assessments, get_assessments, get_latest_assessment, save_assessment};
use crate::models::{
    risk_insights, AssessmentResult, HealthRecord, PartialHealthRecord, PredictionSource,
    RiskInsights,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    #[serde(flatten)]
    pub assessment: AssessmentResult,
    pub insights: RiskInsights,
    pub prediction_source: PredictionSource,
}

pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<PartialHealthRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<AssessmentResponse>), ApiError> {
    let Json(partial) = payload?;
    let record = HealthRecord::with_defaults(&partial);
    let prediction = ctx.predictor.predict(&record).await;

    let assessment = AssessmentResult::new(record, prediction.risk_percentage);
    ctx.with_history(|conn| save_assessment(conn, &assessment))?;

    tracing::info!(
        id = %assessment.id,
        risk = assessment.risk_percentage,
        level = %assessment.risk_level,
        source = %prediction.source,
        "Assessment recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(AssessmentResponse {
            insights: risk_insights(assessment.risk_percentage),
            assessment,
            prediction_source: prediction.source,
        }),
    ))
}

pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<AssessmentResult>>, ApiError> {
    let assessments = ctx.with_history(get_assessments)?;
    Ok(Json(assessments))
}

pub async fn latest(State(ctx): State<ApiContext>) -> Result<Json<AssessmentResult>, ApiError> {
    ctx.with_history(get_latest_assessment)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No assessments yet".into()))
}

pub async fn clear(State(ctx): State<ApiContext>) -> Result<StatusCode, ApiError> {
    ctx.with_history(clear_assessments)?;
    tracing::info!("Assessment history cleared");
    Ok(StatusCode::NO_CONTENT)
}
