use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;

use cartograph_core::error::{CartographError, Result};

/// Outermost `{ ... }` span, across newlines.
static EMBEDDED_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

/// Parses a JSON object out of free-form model output.
///
/// Tries, in order: the whole reply, the reply with Markdown code fences
/// stripped, and the outermost brace-delimited span found anywhere in it.
pub fn parse_embedded_json<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let trimmed = raw.trim();

    let first_error = match serde_json::from_str::<T>(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let unfenced = strip_code_fences(trimmed);
    if unfenced != trimmed {
        if let Ok(value) = serde_json::from_str::<T>(unfenced) {
            return Ok(value);
        }
    }

    if let Some(found) = EMBEDDED_OBJECT.find(trimmed) {
        if let Ok(value) = serde_json::from_str::<T>(found.as_str()) {
            tracing::debug!(
                offset = found.start(),
                "Recovered JSON object embedded in surrounding text"
            );
            return Ok(value);
        }
    }

    Err(CartographError::MalformedClassifierResponse(format!(
        "no JSON object could be parsed from the response: {first_error}"
    )))
}

fn strip_code_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
