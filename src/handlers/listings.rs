use axum::{body::Bytes, extract::State, Json};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::ai::prompts::{hotels_prompt, places_prompt, shopping_prompt};
use crate::messages::{
    HOTELS_PARSE_FAILED, MISSING_PLACE, PLACES_PARSE_FAILED, SHOPPING_PARSE_FAILED,
};
use crate::recovery::extract_array;

use super::text::PlaceRequest;
use super::{parse_body, required, ApiError, AppState};

/// The three intents whose replies are JSON arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Hotels,
    Places,
    Shopping,
}

impl Listing {
    /// Key the records are returned under.
    pub fn key(self) -> &'static str {
        match self {
            Listing::Hotels => "hotels",
            Listing::Places => "places",
            Listing::Shopping => "shopping",
        }
    }

    pub fn prompt(self, place: &str) -> String {
        match self {
            Listing::Hotels => hotels_prompt(place),
            Listing::Places => places_prompt(place),
            Listing::Shopping => shopping_prompt(place),
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Listing::Hotels => HOTELS_PARSE_FAILED,
            Listing::Places => PLACES_PARSE_FAILED,
            Listing::Shopping => SHOPPING_PARSE_FAILED,
        }
    }
}

pub async fn handle_hotels(
    state: State<AppState>,
    body: Bytes,
) -> Result<Json<Map<String, Value>>, ApiError> {
    fetch_listing(state, body, Listing::Hotels).await
}

pub async fn handle_places(
    state: State<AppState>,
    body: Bytes,
) -> Result<Json<Map<String, Value>>, ApiError> {
    fetch_listing(state, body, Listing::Places).await
}

pub async fn handle_shopping(
    state: State<AppState>,
    body: Bytes,
) -> Result<Json<Map<String, Value>>, ApiError> {
    fetch_listing(state, body, Listing::Shopping).await
}

async fn fetch_listing(
    State(state): State<AppState>,
    body: Bytes,
    listing: Listing,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let request: PlaceRequest = parse_body(&body);
    let Some(place) = required(request.place) else {
        return Err(ApiError::MissingField(MISSING_PLACE));
    };

    // Gateway failures come back as text and fail recovery below.
    let raw = state.chat.reply(&listing.prompt(&place)).await;
    let snippet: String = raw.chars().take(200).collect();
    debug!(kind = listing.key(), %place, snippet = %snippet, "raw listing reply");

    let records = extract_array(&raw).map_err(|source| {
        warn!(kind = listing.key(), error = %source, "failed to recover listing");
        ApiError::Listing {
            message: listing.failure_message(),
            source,
        }
    })?;
    debug!(kind = listing.key(), count = records.len(), "listing recovered");

    let records = records
        .into_iter()
        .map(|record| Value::Object(record.into_map()))
        .collect();
    let mut payload = Map::new();
    payload.insert(listing.key().to_string(), Value::Array(records));
    Ok(Json(payload))
}
