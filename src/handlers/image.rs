use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::ai::prompts::{image_prompt, translate_prompt, DEFAULT_LANGUAGE};

use super::{ApiError, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageSearchResponse {
    pub caption: String,
    pub info: String,
}

struct Upload {
    image: Bytes,
    language: String,
}

/// Caption the uploaded photo, ask the model about it, and translate the
/// answer unless English was requested.
#[instrument(level = "debug", skip_all)]
pub async fn handle_image_search(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageSearchResponse>, ApiError> {
    let multipart = multipart.map_err(|err| {
        debug!(error = %err, "image search without multipart body");
        ApiError::NoImage
    })?;
    let upload = read_upload(multipart).await?;
    debug!(size = upload.image.len(), language = %upload.language, "image received");

    let caption = state
        .captioner
        .caption(&upload.image)
        .await
        .map_err(|err| {
            warn!(error = %err, "captioning failed");
            ApiError::Caption(err)
        })?;
    debug!(%caption, "image captioned");

    let mut info = state.chat.reply(&image_prompt(&caption)).await;
    if !upload.language.eq_ignore_ascii_case(DEFAULT_LANGUAGE) {
        debug!(language = %upload.language, "translating image description");
        info = state
            .chat
            .reply(&translate_prompt(&info, &upload.language))
            .await;
    }

    Ok(Json(ImageSearchResponse { caption, info }))
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut image = None;
    let mut language = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "malformed multipart upload");
                return Err(ApiError::Upload(err.to_string()));
            }
        };
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("image") => match field.bytes().await {
                Ok(bytes) => image = Some(bytes),
                Err(err) => {
                    warn!(error = %err, "failed to read image field");
                    return Err(ApiError::Upload(err.to_string()));
                }
            },
            Some("language") => match field.text().await {
                Ok(text) => language = Some(text),
                Err(err) => warn!(error = %err, "failed to read language field"),
            },
            _ => {}
        }
    }

    let image = image.ok_or(ApiError::NoImage)?;
    let language = language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    Ok(Upload { image, language })
}
