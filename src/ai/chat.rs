use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

use crate::ai::config::ChatConfig;
use crate::messages::GATEWAY_FAILURE_PREFIX;

/// Sampling temperature used for every completion.
pub const TEMPERATURE: f32 = 0.7;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [RequestMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("chat API error {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed chat response: {0}")]
    Malformed(String),
}

/// Client for the chat-completion endpoint.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Send `prompt` as a single user message and return the first choice's
    /// text exactly as the API produced it.
    #[instrument(level = "trace", skip(self, prompt), fields(model = %self.config.model))]
    pub async fn ask(&self, prompt: &str) -> Result<String, TransportError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [RequestMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
        };

        let url = self.config.chat_url.as_str();
        debug!(url, prompt_len = prompt.len(), "sending chat completion request");

        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, "chat API error");
            return Err(TransportError::Status { status, body });
        }

        let raw = resp.text().await?;
        let snippet: String = raw.chars().take(200).collect();
        debug!(snippet = %snippet, "chat response body");
        trace!(raw = %raw, "chat response");
        parse_chat_content(&raw)
    }

    /// Like [`ask`](Self::ask), but a failure comes back as a readable
    /// message instead of an error. Callers treat both as reply text.
    pub async fn reply(&self, prompt: &str) -> String {
        into_reply_text(self.ask(prompt).await)
    }
}

pub fn parse_chat_content(raw: &str) -> Result<String, TransportError> {
    let chat: ChatResponse =
        serde_json::from_str(raw).map_err(|e| TransportError::Malformed(e.to_string()))?;
    chat.choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| TransportError::Malformed("missing chat choice".to_string()))
}

/// Fold a gateway result into reply text, marking failures.
pub fn into_reply_text(result: Result<String, TransportError>) -> String {
    match result {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "chat request failed, replying with error text");
            format!("{GATEWAY_FAILURE_PREFIX} {err}")
        }
    }
}
