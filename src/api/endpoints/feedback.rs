//! `POST /api/generate-feedback`: lifestyle recommendations for a bio.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::llm::FeedbackResponse;

#[derive(Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub bio: Option<serde_json::Value>,
}

/// Upstream failures still answer 200 with fallback text; only a missing
/// bio is rejected. A body that is not JSON, or a bio that is not a string,
/// counts as missing.
pub async fn generate(
    State(ctx): State<ApiContext>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> Result<Json<FeedbackResponse>, ApiError> {
    let bio = payload
        .inspect_err(|e| tracing::debug!(error = %e, "Unreadable feedback request"))
        .ok()
        .and_then(|Json(req)| req.bio)
        .and_then(|bio| match bio {
            serde_json::Value::String(bio) if !bio.is_empty() => Some(bio),
            _ => None,
        })
        .ok_or_else(|| ApiError::BadRequest("Bio is required".into()))?;
    Ok(Json(ctx.feedback.generate(&bio).await))
}
