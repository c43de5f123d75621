pub mod chat;
pub mod config;
pub mod prompts;
pub mod vision;
