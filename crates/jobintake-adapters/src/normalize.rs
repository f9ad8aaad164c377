//! Pure text, location, and salary normalizers.

use scraper::Html;
use serde_json::Value as JsonValue;

/// Postings without a usable country are assumed Australian. This is a fixed
/// domain assumption, not a fallback to revisit.
pub const DEFAULT_COUNTRY: &str = "AU";
pub const DEFAULT_CURRENCY: &str = "AUD";

/// Strips markup tags, decodes HTML entities, and collapses whitespace.
/// Returns `None` for empty input. Idempotent: plain text passes through
/// unchanged.
pub fn clean_text(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    let fragment = Html::parse_fragment(text);
    let cleaned = fragment
        .root_element()
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Lowercases and keeps only alphanumeric characters. Used for fingerprint
/// input only, never for display.
pub fn normalize_for_hash(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Resolves the heterogeneous location shapes sources send into
/// `(city, state, country)`.
///
/// Accepted shapes:
/// 1. structured `{city, state, country}` objects;
/// 2. a list of labelled entries (`{"label": "Adelaide SA", "countryCode": "AU"}`),
///    either bare or under a `locations` key;
/// 3. free text such as `"Sydney, NSW"`.
///
/// Anything else yields `(None, None, "AU")`.
pub fn normalize_location(input: Option<&JsonValue>) -> (Option<String>, Option<String>, String) {
    let Some(value) = input else {
        return (None, None, DEFAULT_COUNTRY.to_string());
    };
    match value {
        JsonValue::Object(map) => {
            if map.contains_key("city") || map.contains_key("state") || map.contains_key("country")
            {
                let city = trimmed(map.get("city"));
                let state = trimmed(map.get("state"));
                let country =
                    trimmed(map.get("country")).unwrap_or_else(|| DEFAULT_COUNTRY.to_string());
                return (city, state, country);
            }
            if let Some(entries) = map.get("locations").and_then(JsonValue::as_array) {
                return from_labelled_entries(entries);
            }
            (None, None, DEFAULT_COUNTRY.to_string())
        }
        JsonValue::Array(entries) => from_labelled_entries(entries),
        JsonValue::String(text) => from_free_text(text),
        _ => (None, None, DEFAULT_COUNTRY.to_string()),
    }
}

/// Passes salary bounds through unchanged and defaults the currency when it
/// is absent or blank. No bounds checking, no unit inference.
pub fn normalize_salary(
    min: Option<f64>,
    max: Option<f64>,
    currency: Option<String>,
) -> (Option<f64>, Option<f64>, String) {
    let currency = currency
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    (min, max, currency)
}

fn trimmed(value: Option<&JsonValue>) -> Option<String> {
    value
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Labelled entries carry a human-readable label like `"Adelaide SA"`: every
/// token but the last is the city, the last token is the state.
fn from_labelled_entries(entries: &[JsonValue]) -> (Option<String>, Option<String>, String) {
    let Some(entry) = entries.first().and_then(JsonValue::as_object) else {
        return (None, None, DEFAULT_COUNTRY.to_string());
    };
    let country = trimmed(entry.get("countryCode"))
        .or_else(|| trimmed(entry.get("country_code")))
        .or_else(|| trimmed(entry.get("country")))
        .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());
    let Some(label) = trimmed(entry.get("label")) else {
        return (None, None, country);
    };
    let tokens: Vec<&str> = label.split_whitespace().collect();
    match tokens.split_last() {
        Some((state, city_tokens)) => {
            let city = if city_tokens.is_empty() {
                None
            } else {
                Some(city_tokens.join(" "))
            };
            (city, Some((*state).to_string()), country)
        }
        None => (None, None, country),
    }
}

/// Free text splits on the first comma; the trailing 2+ letter token after
/// the comma is the state. A comma-less string is taken as a bare city.
fn from_free_text(text: &str) -> (Option<String>, Option<String>, String) {
    let country = DEFAULT_COUNTRY.to_string();
    match text.split_once(',') {
        Some((city, rest)) => {
            let city = Some(city.trim())
                .filter(|c| !c.is_empty())
                .map(str::to_string);
            let state = rest
                .split_whitespace()
                .rev()
                .find(|token| token.len() >= 2 && token.chars().all(char::is_alphabetic))
                .map(str::to_string);
            (city, state, country)
        }
        None => {
            let city = Some(text.trim())
                .filter(|c| !c.is_empty())
                .map(str::to_string);
            (city, None, country)
        }
    }
}
