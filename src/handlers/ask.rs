use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::ai::prompts::{ask_prompt, DEFAULT_LANGUAGE};
use crate::messages::MISSING_QUESTION;

use super::{parse_body, required, ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct AskRequest {
    pub location: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub response: String,
}

pub async fn handle_ask(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<AskResponse>, ApiError> {
    let request: AskRequest = parse_body(&body);
    let Some(location) = required(request.location) else {
        return Err(ApiError::MissingField(MISSING_QUESTION));
    };
    let language = required(request.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    tracing::debug!(%location, %language, "answering question");
    let response = state.chat.reply(&ask_prompt(&location, &language)).await;
    Ok(Json(AskResponse { response }))
}
