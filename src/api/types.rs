//! Shared state for the HTTP layer.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::api::server::ServerError;
use crate::config::{history_db_path, PredictionMode, ServiceConfig};
use crate::db::{open_database, DatabaseError};
use crate::llm::{ChatCompletionClient, ChatService, FeedbackService};
use crate::prediction::{PredictionClient, RiskPredictor};

/// Shared context for all API routes.
///
/// The history connection sits behind a plain mutex: handlers take it only
/// for synchronous store calls, never across an `.await`.
#[derive(Clone)]
pub struct ApiContext {
    pub history: Arc<Mutex<Connection>>,
    pub predictor: Arc<RiskPredictor>,
    pub feedback: Arc<FeedbackService>,
    pub chat: Arc<ChatService>,
    pub max_upload_bytes: usize,
}

impl ApiContext {
    pub fn new(
        history: Connection,
        predictor: RiskPredictor,
        feedback: FeedbackService,
        chat: ChatService,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            history: Arc::new(Mutex::new(history)),
            predictor: Arc::new(predictor),
            feedback: Arc::new(feedback),
            chat: Arc::new(chat),
            max_upload_bytes,
        }
    }

    /// Open the history store and build every upstream client from `config`.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServerError> {
        let db_path = history_db_path(&config.data_dir);
        let history = open_database(&db_path)?;
        tracing::info!(path = %db_path.display(), "History store opened");

        let predictor = match &config.prediction {
            PredictionMode::Remote(url) => {
                RiskPredictor::Remote(PredictionClient::new(url, config.prediction_timeout)?)
            }
            PredictionMode::Heuristic => RiskPredictor::Heuristic,
        };

        let feedback = FeedbackService::new(
            &config.openrouter_url,
            &config.openrouter_api_key,
            &config.openrouter_model,
            config.feedback_timeout,
        )?;

        let chat_client = match &config.groq_api_key {
            Some(key) => Some(ChatCompletionClient::new(
                &config.groq_url,
                key,
                &config.groq_model,
                config.chat_timeout,
            )?),
            None => {
                tracing::warn!("GROQ_API_KEY not set, chat will answer with fallback replies");
                None
            }
        };
        let chat = ChatService::new(chat_client, &config.system_prompt);

        Ok(Self::new(
            history,
            predictor,
            feedback,
            chat,
            config.max_upload_bytes,
        ))
    }

    /// Run a synchronous history-store operation under the connection lock.
    pub fn with_history<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, ApiError> {
        let conn = self
            .history
            .lock()
            .map_err(|_| ApiError::Internal("history lock poisoned".into()))?;
        Ok(op(&conn)?)
    }
}

#[cfg(test)]
pub(crate) mod test_context {
    use std::time::Duration;

    use super::*;
    use crate::db::open_memory_database;

    /// In-memory history, heuristic predictor, no chat provider, and a
    /// feedback client aimed at `feedback_url`.
    pub fn context(feedback_url: &str) -> ApiContext {
        ApiContext::new(
            open_memory_database().unwrap(),
            RiskPredictor::Heuristic,
            FeedbackService::new(feedback_url, "sk-test", "openrouter/free", Duration::from_secs(2))
                .unwrap(),
            ChatService::new(None, "prompt"),
            1024 * 1024,
        )
    }
}
