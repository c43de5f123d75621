use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use crate::ai::config::{CaptionConfig, ChatConfig};

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
    pub ai: ChatConfig,
    pub caption: CaptionConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:5000".to_string())
            .parse()
            .context("BIND_ADDR is not a valid socket address")?;
        let static_dir = env::var("STATIC_DIR")
            .unwrap_or_else(|_| "templates/dist".to_string())
            .into();
        let ai = ChatConfig::from_env().ok_or_else(|| anyhow!("GROQ_API_KEY is not set"))?;
        let caption = CaptionConfig::from_env();
        Ok(Self {
            bind_addr,
            static_dir,
            ai,
            caption,
        })
    }
}
