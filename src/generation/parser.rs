// Suggestion parsing for loosely structured model output

use crate::error::{BouquetError, Result};
use crate::models::bouquet::SuggestionSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Matches a markdown code fence, with or without a `json` language tag.
static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```(?:json)?\n?((?s:.*?))\n?```").unwrap());

/// Strip markdown code fences from model output, keeping the fenced
/// content. Idempotent: unfenced text passes through (modulo surrounding
/// whitespace).
pub fn strip_code_fence(text: &str) -> String {
    FENCE_RE.replace_all(text, "$1").trim().to_string()
}

fn parse_error(message: impl Into<String>, text: &str) -> BouquetError {
    BouquetError::Parse {
        message: message.into(),
        text: text.to_string(),
    }
}

/// Extract a validated suggestion set from freeform model text.
///
/// The model is asked for `{"suggestions": [[...], ...]}` but only
/// informally promises it, so the payload is treated as hostile: fencing
/// is tolerated, everything else is checked. Every combination must be an
/// array of 3–5 strings; one violation invalidates the whole set. Names
/// are returned as-is, with no normalization.
pub fn parse_suggestions(raw_text: &str) -> Result<SuggestionSet> {
    let cleaned = strip_code_fence(raw_text);

    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| parse_error(format!("not well-formed JSON: {e}"), raw_text))?;

    let suggestions = value
        .get("suggestions")
        .ok_or_else(|| parse_error("missing `suggestions` field", raw_text))?
        .as_array()
        .ok_or_else(|| parse_error("`suggestions` is not an array", raw_text))?;

    let mut combinations = Vec::with_capacity(suggestions.len());
    for (index, entry) in suggestions.iter().enumerate() {
        let items = entry
            .as_array()
            .ok_or_else(|| parse_error(format!("suggestion {index} is not an array"), raw_text))?;

        if !(3..=5).contains(&items.len()) {
            return Err(parse_error(
                format!(
                    "suggestion {index} has {} flowers, expected 3 to 5",
                    items.len()
                ),
                raw_text,
            ));
        }

        let flowers = items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    parse_error(format!("suggestion {index} contains a non-string entry"), raw_text)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        combinations.push(flowers);
    }

    Ok(SuggestionSet { combinations })
}
