use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::LlmError;

/// One turn of a chat-completions conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

/// Request body for `POST /chat/completions`
#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// HTTP client for an OpenAI-compatible chat-completions endpoint.
pub struct ChatCompletionClient {
    url: String,
    api_key: String,
    model: String,
    headers: Vec<(&'static str, String)>,
    client: reqwest::Client,
}

impl ChatCompletionClient {
    /// `url` is the full completions endpoint; `timeout` bounds the whole
    /// exchange, body included.
    pub fn new(url: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::HttpClient(e.to_string()))?;

        Ok(Self {
            url: url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            headers: Vec::new(),
            client,
        })
    }

    /// Extra header sent with every request (e.g. OpenRouter's `X-Title`).
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `messages` and return the first choice's content.
    ///
    /// `Ok(None)` means the provider answered successfully but without any
    /// message content. The body is parsed before the status is checked, so
    /// a non-JSON error page reports as `ResponseParsing`.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: Option<f32>,
    ) -> Result<Option<String>, LlmError> {
        let body = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens,
            temperature,
        };

        let mut request = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body);
        for (name, value) in &self.headers {
            request = request.header(*name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(e, &self.url))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::from_reqwest(e, &self.url))?;
        tracing::debug!(status = status.as_u16(), body_len = text.len(), "Completion response");

        if text.is_empty() {
            return Err(LlmError::EmptyBody);
        }

        let data: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        if !status.is_success() {
            return Err(LlmError::ProviderError {
                status: status.as_u16(),
                body: data.to_string(),
            });
        }

        Ok(first_choice_content(&data))
    }
}

/// `choices[0].message.content`, when it is a non-empty string.
fn first_choice_content(data: &serde_json::Value) -> Option<String> {
    data.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
