use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::ai::prompts::{place_info_prompt, translate_prompt};
use crate::messages::{MISSING_PLACE, MISSING_TRANSLATION_INPUT};

use super::{parse_body, required, ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct TranslateRequest {
    pub text: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translation: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaceRequest {
    pub place: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceInfoResponse {
    pub info: String,
}

pub async fn handle_translate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TranslateResponse>, ApiError> {
    let request: TranslateRequest = parse_body(&body);
    let (Some(text), Some(language)) = (required(request.text), required(request.language))
    else {
        return Err(ApiError::MissingField(MISSING_TRANSLATION_INPUT));
    };

    tracing::debug!(%language, chars = text.chars().count(), "translating text");
    let translation = state.chat.reply(&translate_prompt(&text, &language)).await;
    Ok(Json(TranslateResponse { translation }))
}

pub async fn handle_place_info(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PlaceInfoResponse>, ApiError> {
    let request: PlaceRequest = parse_body(&body);
    let Some(place) = required(request.place) else {
        return Err(ApiError::MissingField(MISSING_PLACE));
    };

    tracing::debug!(%place, "building travel guide");
    let info = state.chat.reply(&place_info_prompt(&place)).await;
    Ok(Json(PlaceInfoResponse { info }))
}
