//! Lenient extraction of the JSON object a model was asked to return.

use serde_json::{Map, Value};

/// Parse `text` as a JSON object, tolerating a markdown fence or prose
/// around it. Returns `None` if no object can be recovered.
pub fn parse_json_object(text: &str) -> Option<Map<String, Value>> {
    let trimmed = text.trim();

    // Try direct parse first
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return Some(map);
    }

    // Try the outermost {...} span (code block or chatty preamble)
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&trimmed[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => {
            tracing::debug!("Could not parse model response as JSON: {}", trimmed);
            None
        }
    }
}
