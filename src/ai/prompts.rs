//! Prompt templates for every travel-guide intent.
//!
//! Each builder interpolates user input into a fixed instruction. The listing
//! prompts ask for raw JSON, but replies still go through
//! [`crate::recovery::extract_array`] because the model does not always obey.

/// Language used when the client does not pick one.
pub const DEFAULT_LANGUAGE: &str = "English";

pub fn ask_prompt(location: &str, language: &str) -> String {
    format!("Answer the following as a travel guide in {language}: Tell me about {location}")
}

pub fn image_prompt(caption: &str) -> String {
    format!(
        "Act as a knowledgeable travel guide and give detailed historical and cultural information about this image: '{caption}'"
    )
}

pub fn translate_prompt(text: &str, language: &str) -> String {
    format!("Translate the following text to {language}:\n\n{text}")
}

pub fn place_info_prompt(place: &str) -> String {
    format!(
        "Give a complete travel guide about {place} including:\n- Best hotels\n- Tourist attractions\n- Popular food spots\n- Travel routes and tips"
    )
}

pub fn hotels_prompt(place: &str) -> String {
    format!(
        "Only return raw JSON, nothing else. List 6 hotels in {place}:\n\
         [{{\"name\": \"Hotel Name\", \"location\": \"City Area\", \"rating\": \"4.5\", \
         \"price\": \"$100/night\", \"amenities\": [\"WiFi\", \"Pool\"], \
         \"reviews\": \"list of 2-3 reviews of peoples \", \
         \"locationURL\": \"URL\", \
         \"description\": \"Luxury hotel with great views.\"}},...]"
    )
}

pub fn places_prompt(place: &str) -> String {
    format!(
        "Only return raw JSON, nothing else. List 6 famous places in {place}:\n\
         [{{\"name\": \"place name\", \"type\": \"Park\", \"location\": \"City Area\", \"rating\": \"4.6\", \
         \"description\": \"Nice place.\", \
         \"reviews\": \"list of 5-6 reviews of peoples\", \
         \"locationURL\": \"URL\"}}, ...]"
    )
}

pub fn shopping_prompt(place: &str) -> String {
    format!(
        "Only return raw JSON, nothing else. List 6 shopping places in {place}:\n\
         [{{\"name\": \"Shop Name\", \"type\": \"Market\", \"location\": \"City Area\", \"rating\": \"4.3\", \
         \"description\": \"Great local market.\", \
         \"reviews\": [\"Amazing place!\", \"Loved the variety of shops.\", \"Affordable prices.\"], \
         \"locationURL\": \"https://maps.google.com/?q=Shop+Name\"}}, ...]"
    )
}

/// Used by the interactive `tour` binary.
pub fn tour_guide_prompt(location: &str) -> String {
    format!(
        "You are a friendly and knowledgeable AI tour guide. \
         A user is currently visiting {location}. \
         Provide a fun and engaging description of this place, including a bit of history, interesting facts, and travel tips. \
         Keep it concise and enjoyable like a real tour guide would!"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_prompt_interpolates_language_and_location() {
        assert_eq!(
            ask_prompt("Taj Mahal", "Hindi"),
            "Answer the following as a travel guide in Hindi: Tell me about Taj Mahal"
        );
    }

    #[test]
    fn translate_prompt_separates_text() {
        assert_eq!(
            translate_prompt("Hello", "French"),
            "Translate the following text to French:\n\nHello"
        );
    }

    #[test]
    fn listing_prompts_demand_raw_json() {
        for prompt in [
            hotels_prompt("Paris"),
            places_prompt("Paris"),
            shopping_prompt("Paris"),
        ] {
            assert!(prompt.starts_with("Only return raw JSON, nothing else. List 6 "));
            assert!(prompt.contains(" in Paris:\n["));
            assert!(prompt.contains("\"locationURL\""));
        }
    }

    #[test]
    fn listing_prompt_examples_use_single_braces() {
        let prompt = hotels_prompt("Rome");
        assert!(prompt.contains("[{\"name\": \"Hotel Name\""));
        assert!(prompt.ends_with("great views.\"},...]"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn place_info_lists_sections() {
        let prompt = place_info_prompt("Kyoto");
        assert!(prompt.starts_with("Give a complete travel guide about Kyoto including:"));
        assert!(prompt.ends_with("- Travel routes and tips"));
    }

    #[test]
    fn image_prompt_quotes_caption() {
        assert!(image_prompt("a tall tower").ends_with("about this image: 'a tall tower'"));
    }

    #[test]
    fn tour_guide_prompt_mentions_location() {
        assert!(tour_guide_prompt("Eiffel Tower").contains("currently visiting Eiffel Tower."));
    }
}
