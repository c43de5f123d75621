//! Recover a JSON array of records from free-form model output.
//!
//! Models asked for "only raw JSON" still wrap their answer in prose or
//! markdown fences. [`extract_array`] finds the embedded array and parses it,
//! and tells "no array at all" apart from "an array that does not parse".

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, trace};

/// `[` ... `{` ... `}` ... `]`, shortest span first.
static ARRAY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\[\s*\{.*?\}\s*\]").expect("array pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecoveryError {
    #[error("no JSON array found in model reply")]
    NoArrayFound { raw: String },
    #[error("malformed JSON array in model reply: {detail}")]
    MalformedJson {
        raw: String,
        matched: String,
        detail: String,
    },
}

impl RecoveryError {
    /// The untouched model reply.
    pub fn raw(&self) -> &str {
        match self {
            RecoveryError::NoArrayFound { raw } => raw,
            RecoveryError::MalformedJson { raw, .. } => raw,
        }
    }
}

/// One listing entry as produced by the model.
///
/// Nothing about its keys is guaranteed, so the object is kept verbatim and
/// the usual fields are exposed through optional accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

/// `reviews` arrives either as one string or as a list of strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Reviews<'a> {
    Text(&'a str),
    List(Vec<&'a str>),
}

impl Record {
    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn location(&self) -> Option<&str> {
        self.str_field("location")
    }

    pub fn rating(&self) -> Option<&str> {
        self.str_field("rating")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    pub fn location_url(&self) -> Option<&str> {
        self.str_field("locationURL")
    }

    pub fn kind(&self) -> Option<&str> {
        self.str_field("type")
    }

    pub fn price(&self) -> Option<&str> {
        self.str_field("price")
    }

    pub fn amenities(&self) -> Vec<&str> {
        match self.0.get("amenities") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn reviews(&self) -> Option<Reviews<'_>> {
        match self.0.get("reviews")? {
            Value::String(text) => Some(Reviews::Text(text)),
            Value::Array(items) => Some(Reviews::List(
                items.iter().filter_map(Value::as_str).collect(),
            )),
            _ => None,
        }
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Locate and parse the JSON array of objects embedded in `raw`.
///
/// Only the first bracketed region counts: if it does not parse, the reply is
/// malformed even when a later region would.
pub fn extract_array(raw: &str) -> Result<Vec<Record>, RecoveryError> {
    let Some(found) = ARRAY_PATTERN.find(raw) else {
        debug!("no bracketed array in reply");
        return Err(RecoveryError::NoArrayFound {
            raw: raw.to_string(),
        });
    };

    let strict_error = match serde_json::from_str::<Vec<Record>>(found.as_str()) {
        Ok(records) => return Ok(records),
        Err(err) => err,
    };
    trace!(error = %strict_error, "shortest match did not parse, widening");
    if let Some(records) = parse_leading_array(&raw[found.start()..]) {
        return Ok(records);
    }

    debug!(error = %strict_error, "bracketed region is not valid JSON");
    Err(RecoveryError::MalformedJson {
        raw: raw.to_string(),
        matched: found.as_str().to_string(),
        detail: strict_error.to_string(),
    })
}

/// Parse the one array that starts at the beginning of `text`, ignoring
/// whatever follows it.
fn parse_leading_array(text: &str) -> Option<Vec<Record>> {
    serde_json::Deserializer::from_str(text)
        .into_iter::<Vec<Record>>()
        .next()
        .and_then(Result::ok)
}
