//! Chat endpoints:
//! - `POST /api/chat`: one turn of a conversation
//! - `DELETE /api/chat/:id`: forget a conversation

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::llm::ChatReply;

const MAX_MESSAGE_CHARS: usize = 2000;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub conversation_id: Option<String>,
    pub message: String,
}

pub async fn send(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(req) = payload?;
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message cannot be empty".into()));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::BadRequest("Message too long (max 2000 chars)".into()));
    }

    Ok(Json(ctx.chat.ask(req.conversation_id, message).await))
}

pub async fn reset(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if ctx.chat.reset(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Conversation {id} not found")))
    }
}
