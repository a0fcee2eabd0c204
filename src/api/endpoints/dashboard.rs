//! `GET /api/dashboard`: latest result with its insights and trend.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::get_assessments;
use crate::models::{latest_trend, risk_insights, AssessmentResult, RiskInsights, RiskTrend};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub latest: AssessmentResult,
    pub insights: RiskInsights,
    pub trend: Option<RiskTrend>,
    pub previous_risk_percentage: Option<f64>,
    pub assessment_count: usize,
}

pub async fn dashboard(State(ctx): State<ApiContext>) -> Result<Json<DashboardResponse>, ApiError> {
    let history = ctx.with_history(get_assessments)?;
    let trend = latest_trend(&history);
    let previous_risk_percentage = history.get(1).map(|a| a.risk_percentage);
    let assessment_count = history.len();

    let latest = history
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("No assessments yet".into()))?;

    Ok(Json(DashboardResponse {
        insights: risk_insights(latest.risk_percentage),
        latest,
        trend,
        previous_risk_percentage,
        assessment_count,
    }))
}
