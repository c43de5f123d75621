use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::ai::chat::ChatClient;
use crate::ai::config::ChatConfig;
use crate::ai::vision::{CaptionError, Captioner};
use crate::handlers::AppState;

/// Captioner that returns a canned caption without loading any weights.
pub struct StubCaptioner {
    caption: Option<String>,
    calls: AtomicUsize,
}

impl StubCaptioner {
    pub fn ok(caption: &str) -> Arc<Self> {
        Arc::new(Self {
            caption: Some(caption.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    /// Fails every call with an inference error.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            caption: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Captioner for StubCaptioner {
    async fn caption(&self, _image: &[u8]) -> Result<String, CaptionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.caption
            .clone()
            .ok_or_else(|| CaptionError::Inference("stub failure".to_string()))
    }
}

pub fn test_chat_config(chat_url: &str) -> ChatConfig {
    ChatConfig {
        api_key: "test-key".to_string(),
        chat_url: chat_url.to_string(),
        model: "test-model".to_string(),
    }
}

pub fn test_state(chat_url: &str, captioner: Arc<dyn Captioner>) -> AppState {
    AppState::new(ChatClient::new(test_chat_config(chat_url)), captioner)
}

/// A chat-completion response body whose single choice says `content`.
pub fn chat_completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}
