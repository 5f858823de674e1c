// file: src/utils/json.rs
// description: lenient recovery of json payloads embedded in model responses
// reference: fenced-block and brace-scan extraction

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref FENCED_BLOCK: Regex =
        Regex::new(r"(?s)```[a-zA-Z]*\s*\n?(.*?)```").expect("valid fenced block pattern");
}

/// Finds the first json object or array in a model response.
///
/// Tries, in order: the whole response, the first fenced code block, then the
/// widest `{...}` or `[...]` span. Returns `None` when nothing parses.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Some(value) = parse_structured(trimmed) {
        return Some(value);
    }

    if let Some(captures) = FENCED_BLOCK.captures(trimmed)
        && let Some(value) = captures.get(1).and_then(|m| parse_structured(m.as_str().trim()))
    {
        return Some(value);
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close))
            && start < end
            && let Some(value) = parse_structured(&trimmed[start..=end])
        {
            return Some(value);
        }
    }

    None
}

fn parse_structured(candidate: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(value),
        _ => None,
    }
}

/// Renders a json value as a plain cell: strings unquoted, null empty.
pub fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
