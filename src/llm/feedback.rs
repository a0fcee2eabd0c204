use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::client::{ChatCompletionClient, ChatMessage};
use super::LlmError;
use crate::models::FeedbackSource;

/// Returned whenever the provider cannot produce usable feedback.
pub const FALLBACK_FEEDBACK: &str = "• Schedule a check-up with your doctor\n\
• Aim for 150 minutes of moderate exercise weekly\n\
• Reduce salt and processed foods\n\
• Manage stress through relaxation techniques";

/// Successful response without message content.
pub const NO_FEEDBACK: &str = "No feedback received";

const FEEDBACK_MAX_TOKENS: u32 = 5000;
const FEEDBACK_TEMPERATURE: f32 = 0.7;
const REFERER: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub feedback: String,
    pub source: FeedbackSource,
}

impl FeedbackResponse {
    fn fallback(source: FeedbackSource) -> Self {
        Self {
            feedback: FALLBACK_FEEDBACK.to_string(),
            source,
        }
    }
}

fn build_prompt(bio: &str) -> String {
    format!(
        "You are a healthcare expert. Given this patient profile with their CVD risk, \
         provide 3-4 specific lifestyle recommendations bulleted (1 - 4) slightly detailed \
         avoid md. Dont do an introduction just start with the bullet points. :\n\n{bio}"
    )
}

/// Lifestyle recommendations from OpenRouter, degrading to canned advice.
pub struct FeedbackService {
    client: ChatCompletionClient,
}

impl FeedbackService {
    pub fn new(url: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = ChatCompletionClient::new(url, api_key, model, timeout)?
            .with_header("HTTP-Referer", REFERER)
            .with_header("X-Title", crate::config::APP_NAME);
        Ok(Self { client })
    }

    /// Never fails: every upstream problem maps to a `fallback-*` source.
    pub async fn generate(&self, bio: &str) -> FeedbackResponse {
        tracing::info!(bio_len = bio.len(), model = self.client.model(), "Requesting feedback");

        let messages = [ChatMessage::user(build_prompt(bio))];
        match self
            .client
            .complete(&messages, FEEDBACK_MAX_TOKENS, Some(FEEDBACK_TEMPERATURE))
            .await
        {
            Ok(content) => {
                let feedback = content.unwrap_or_else(|| NO_FEEDBACK.to_string());
                tracing::info!(feedback_len = feedback.len(), "Feedback generated");
                FeedbackResponse {
                    feedback,
                    source: FeedbackSource::OpenRouter,
                }
            }
            Err(e) => {
                let source = fallback_source(&e);
                tracing::warn!(error = %e, source = %source, "Feedback fell back to defaults");
                FeedbackResponse::fallback(source)
            }
        }
    }
}

fn fallback_source(err: &LlmError) -> FeedbackSource {
    match err {
        LlmError::EmptyBody => FeedbackSource::FallbackEmpty,
        LlmError::ResponseParsing(_) => FeedbackSource::FallbackParseError,
        LlmError::ProviderError { .. } => FeedbackSource::FallbackApiError,
        LlmError::Timeout => FeedbackSource::FallbackTimeout,
        LlmError::Connection(_) | LlmError::HttpClient(_) => FeedbackSource::FallbackError,
    }
}
