//! Error text returned to the frontend.
//!
//! Keep client-visible strings here so the frontend contract lives in one
//! place.

pub const MISSING_QUESTION: &str = "Missing question input.";
pub const MISSING_PLACE: &str = "Missing place name.";
pub const MISSING_TRANSLATION_INPUT: &str = "Missing text or language selection.";
pub const NO_IMAGE_UPLOADED: &str = "No image uploaded.";

pub const HOTELS_PARSE_FAILED: &str = "Failed to parse hotel data.";
pub const PLACES_PARSE_FAILED: &str = "Failed to parse places data.";
pub const SHOPPING_PARSE_FAILED: &str = "Failed to parse shopping data.";

/// Prefix of the reply text produced when the chat API cannot be reached.
pub const GATEWAY_FAILURE_PREFIX: &str = "Error calling chat API:";

pub fn caption_failed(detail: &str) -> String {
    format!("Failed to caption image: {detail}")
}
