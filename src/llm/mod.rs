//! Hosted language-model access.
//!
//! `client` speaks the OpenAI-compatible chat-completions protocol used by
//! both providers. `feedback` wraps it for one-shot recommendations and
//! `chat` for multi-turn conversations. Neither surfaces upstream failures
//! to callers: they resolve to canned text tagged with its origin.

pub mod chat;
pub mod client;
pub mod feedback;

pub use chat::*;
pub use client::*;
pub use feedback::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Request timed out")]
    Timeout,

    #[error("Cannot reach model provider at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Model provider returned empty body")]
    EmptyBody,

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Model provider returned error (status {status}): {body}")]
    ProviderError { status: u16, body: String },
}

impl LlmError {
    pub(crate) fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::Connection(url.to_string())
        } else {
            LlmError::HttpClient(err.to_string())
        }
    }
}
