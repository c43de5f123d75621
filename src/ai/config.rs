use std::env;
use std::path::PathBuf;

pub const DEFAULT_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_CHAT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

/// Settings for the chat-completion API.
#[derive(Clone, Debug)]
pub struct ChatConfig {
    pub api_key: String,
    pub chat_url: String,
    pub model: String,
}

impl ChatConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = match env::var("GROQ_API_KEY") {
            Ok(k) if !k.trim().is_empty() => k,
            _ => return None,
        };
        Some(Self {
            api_key,
            chat_url: env::var("GROQ_API_URL").unwrap_or_else(|_| DEFAULT_CHAT_URL.to_string()),
            model: env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
        })
    }
}

/// Where the captioning weights live and how to run them.
#[derive(Clone, Debug)]
pub struct CaptionConfig {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub force_cpu: bool,
    pub preload: bool,
}

impl CaptionConfig {
    pub fn from_env() -> Self {
        Self {
            model_path: env::var("CAPTION_MODEL_PATH")
                .unwrap_or_else(|_| "models/blip/model.safetensors".to_string())
                .into(),
            tokenizer_path: env::var("CAPTION_TOKENIZER_PATH")
                .unwrap_or_else(|_| "models/blip/tokenizer.json".to_string())
                .into(),
            force_cpu: env_flag("CAPTION_FORCE_CPU"),
            preload: env_flag("CAPTION_PRELOAD"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
