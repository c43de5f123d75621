use std::sync::Arc;

use axum::{
    body::Bytes,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::ai::chat::ChatClient;
use crate::ai::vision::{CaptionError, Captioner};
use crate::messages::{caption_failed, NO_IMAGE_UPLOADED};
use crate::recovery::RecoveryError;

pub mod ask;
pub mod image;
pub mod listings;
pub mod text;

pub use ask::handle_ask;
pub use image::handle_image_search;
pub use listings::{handle_hotels, handle_places, handle_shopping, Listing};
pub use text::{handle_place_info, handle_translate};

/// Shared per-process dependencies of every handler.
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatClient,
    pub captioner: Arc<dyn Captioner>,
}

impl AppState {
    pub fn new(chat: ChatClient, captioner: Arc<dyn Captioner>) -> Self {
        Self { chat, captioner }
    }
}

/// Request failures reported in-band.
///
/// The frontend expects HTTP 200 with an `error` key, so every variant renders
/// with status 200.
#[derive(Debug)]
pub enum ApiError {
    MissingField(&'static str),
    NoImage,
    /// The multipart stream broke off, e.g. past the body size limit.
    Upload(String),
    Caption(CaptionError),
    Listing {
        message: &'static str,
        source: RecoveryError,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            ApiError::MissingField(message) => json!({ "error": message }),
            ApiError::NoImage => json!({ "error": NO_IMAGE_UPLOADED }),
            ApiError::Upload(detail) => {
                json!({ "error": caption_failed(&format!("unreadable upload: {detail}")) })
            }
            ApiError::Caption(err) => json!({ "error": caption_failed(&err.to_string()) }),
            ApiError::Listing { message, source } => {
                json!({ "error": message, "raw": source.raw() })
            }
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

/// Parse a JSON body, treating anything unreadable as an empty request.
pub(crate) fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    match serde_json::from_slice(body) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::debug!(error = %err, "request body unreadable, treating as empty");
            T::default()
        }
    }
}

/// A present, non-blank field value.
pub(crate) fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
