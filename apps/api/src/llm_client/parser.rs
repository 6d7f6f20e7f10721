//! Response parsing: turns free-text model output into well-formed records.
//!
//! Nothing in here returns an error. Malformed model output degrades to a
//! safe default so that callers never need an error branch for it.

use serde_json::{json, Map, Value};
use tracing::{error, warn};

use crate::models::analysis::{AnalysisRecord, NOT_SPECIFIED};

const POSITIVE_INDICATORS: &[&str] = &["true", "yes", "valid", "matches", "suitable", "appropriate"];

const NEGATIVE_INDICATORS: &[&str] = &[
    "false",
    "no",
    "invalid",
    "does not match",
    "unsuitable",
    "inappropriate",
];

/// Decodes the model output into a JSON object.
///
/// 1. The whole text as JSON.
/// 2. The span from the first `{` to the last `}` (inclusive).
/// 3. A fixed "failed to parse" mapping.
///
/// Prose containing stray braces around the object is not handled.
pub fn parse_structured(text: &str) -> Map<String, Value> {
    decode_structured(text).unwrap_or_else(parse_failure)
}

fn decode_structured(text: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return Some(map);
    }

    warn!("Failed to parse model response directly, attempting object extraction");

    match extract_json_object(text).map(serde_json::from_str::<Value>) {
        Some(Ok(Value::Object(map))) => Some(map),
        Some(Ok(_)) => {
            error!("Extracted span from model response is not a JSON object");
            None
        }
        Some(Err(e)) => {
            error!("Failed to parse extracted model response: {e}");
            None
        }
        None => {
            error!("No JSON object found in model response");
            None
        }
    }
}

/// Returns the slice between the first `{` and the last `}`, inclusive.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn parse_failure() -> Map<String, Value> {
    let value = json!({
        "valid": false,
        "summary": "Failed to parse model response",
        "key_skills": [],
        "required_experience": null,
        "company_culture": null,
        "estimated_salary_range": null
    });
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// True for the fixed mapping `parse_structured` returns when the model
/// output held no usable object.
pub fn is_parse_failure(raw: &Map<String, Value>) -> bool {
    *raw == parse_failure()
}

/// Coerces a decoded mapping into an `AnalysisRecord`. Total over all inputs.
pub fn validate(raw: &Map<String, Value>) -> AnalysisRecord {
    AnalysisRecord {
        valid: raw.get("valid").map(truthy).unwrap_or(false),
        summary: match raw.get("summary") {
            None | Some(Value::Null) => String::new(),
            Some(value) => as_text(value),
        },
        key_skills: match raw.get("key_skills") {
            Some(Value::Array(items)) => items
                .iter()
                .filter(|item| !item.is_null())
                .map(as_text)
                .collect(),
            _ => Vec::new(),
        },
        required_experience: text_or_not_specified(raw.get("required_experience")),
        company_culture: text_or_not_specified(raw.get("company_culture")),
        estimated_salary_range: text_or_not_specified(raw.get("estimated_salary_range")),
    }
}

/// Interprets a yes/no answer from the model.
///
/// A JSON boolean, or a JSON object with a `valid` key, wins outright.
/// Otherwise the lower-cased text is scanned for indicator phrases and the
/// answer is `true` only when positive hits strictly outnumber negative ones.
/// Substring hits count, so "invalid" also counts once as "valid".
pub fn parse_boolean_decision(text: &str) -> bool {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Bool(decision)) => return decision,
        Ok(Value::Object(map)) if map.contains_key("valid") => {
            return map.get("valid").map(truthy).unwrap_or(false);
        }
        _ => {}
    }

    let lowered = text.to_lowercase();
    let positive = count_indicators(&lowered, POSITIVE_INDICATORS);
    let negative = count_indicators(&lowered, NEGATIVE_INDICATORS);

    if positive == 0 && negative == 0 {
        warn!("Validation response carried no decision indicators, treating as false");
    }

    positive > negative
}

fn count_indicators(text: &str, phrases: &[&str]) -> usize {
    phrases
        .iter()
        .map(|phrase| text.matches(phrase).count())
        .sum()
}

/// Boolean coercion for model-provided values.
///
/// Strings only count as true when they spell `true`; models that quote
/// their booleans mean the literal, not "non-empty".
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn text_or_not_specified(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_SPECIFIED.to_string(),
        Some(value) => as_text(value),
    }
}
