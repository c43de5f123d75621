use guidebot::ai::config::{CaptionConfig, ChatConfig, DEFAULT_CHAT_MODEL, DEFAULT_CHAT_URL};
use guidebot::Config;
use serial_test::serial;

fn clear_env() {
    for key in [
        "GROQ_API_KEY",
        "GROQ_API_URL",
        "GROQ_MODEL",
        "BIND_ADDR",
        "STATIC_DIR",
        "CAPTION_MODEL_PATH",
        "CAPTION_TOKENIZER_PATH",
        "CAPTION_FORCE_CPU",
        "CAPTION_PRELOAD",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn chat_config_requires_key() {
    clear_env();
    assert!(ChatConfig::from_env().is_none());
    std::env::set_var("GROQ_API_KEY", "   ");
    assert!(ChatConfig::from_env().is_none());
}

#[test]
#[serial]
fn chat_config_defaults() {
    clear_env();
    std::env::set_var("GROQ_API_KEY", "k");
    let cfg = ChatConfig::from_env().unwrap();
    assert_eq!(cfg.api_key, "k");
    assert_eq!(cfg.chat_url, DEFAULT_CHAT_URL);
    assert_eq!(cfg.model, DEFAULT_CHAT_MODEL);
}

#[test]
#[serial]
fn chat_config_overrides() {
    clear_env();
    std::env::set_var("GROQ_API_KEY", "k");
    std::env::set_var("GROQ_API_URL", "http://localhost:1234/v1/chat/completions");
    std::env::set_var("GROQ_MODEL", "llama-test");
    let cfg = ChatConfig::from_env().unwrap();
    assert_eq!(cfg.chat_url, "http://localhost:1234/v1/chat/completions");
    assert_eq!(cfg.model, "llama-test");
}

#[test]
#[serial]
fn caption_config_flags() {
    clear_env();
    let cfg = CaptionConfig::from_env();
    assert!(!cfg.force_cpu);
    assert!(!cfg.preload);
    assert!(cfg.model_path.ends_with("model.safetensors"));

    std::env::set_var("CAPTION_FORCE_CPU", "true");
    std::env::set_var("CAPTION_PRELOAD", "1");
    std::env::set_var("CAPTION_TOKENIZER_PATH", "/opt/blip/tokenizer.json");
    let cfg = CaptionConfig::from_env();
    assert!(cfg.force_cpu);
    assert!(cfg.preload);
    assert_eq!(cfg.tokenizer_path.to_str(), Some("/opt/blip/tokenizer.json"));
}

#[test]
#[serial]
fn config_from_env_reads_server_settings() {
    clear_env();
    std::env::set_var("GROQ_API_KEY", "k");
    std::env::set_var("BIND_ADDR", "0.0.0.0:8080");
    std::env::set_var("STATIC_DIR", "web/dist");
    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg.bind_addr.port(), 8080);
    assert_eq!(cfg.static_dir.to_str(), Some("web/dist"));
    assert_eq!(cfg.ai.api_key, "k");
}

#[test]
#[serial]
fn config_from_env_rejects_bad_address() {
    clear_env();
    std::env::set_var("GROQ_API_KEY", "k");
    std::env::set_var("BIND_ADDR", "not-an-address");
    assert!(Config::from_env().is_err());
}
