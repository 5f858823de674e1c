// file: src/models/query.rs
// description: structured query produced by the decompose stage
// reference: internal data structures

use crate::utils::json::{extract_json, value_to_cell};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Attributes the decompose model pulled out of the user's query.
///
/// Nothing here is validated: fields the model did not return stay `None`,
/// unrecognized attributes land in `extra`, and `raw` always keeps the
/// untouched response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<u32>,
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
    pub raw: String,
}

impl StructuredQuery {
    pub fn from_response(raw: impl Into<String>) -> Self {
        let raw = raw.into();

        let Some(Value::Object(mut attributes)) = extract_json(&raw) else {
            return Self {
                raw,
                ..Self::default()
            };
        };

        Self {
            make: take_text(&mut attributes, "make"),
            model: take_text(&mut attributes, "model"),
            year: take_year(&mut attributes),
            location: take_text(&mut attributes, "location"),
            extra: attributes.into_iter().collect(),
            raw,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.make.is_none()
            && self.model.is_none()
            && self.year.is_none()
            && self.location.is_none()
            && self.extra.is_empty()
    }
}

fn take_text(attributes: &mut Map<String, Value>, key: &str) -> Option<String> {
    attributes
        .remove(key)
        .map(|value| value_to_cell(&value))
        .filter(|text| !text.trim().is_empty())
}

fn take_year(attributes: &mut Map<String, Value>) -> Option<u32> {
    let value = attributes.remove("year")?;

    let year = match &value {
        Value::Number(n) => n.as_u64().and_then(|y| u32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        Value::Null => return None,
        _ => None,
    };

    // Anything that is not a plain year stays visible as an extra attribute.
    if year.is_none() {
        attributes.insert("year".to_string(), value);
    }
    year
}

/// Renders the query the way a person would type it, e.g.
/// `2017 Roadtrek CS Adventurous XL in Texas`. Falls back to the raw response
/// when the model returned nothing structured.
impl fmt::Display for StructuredQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(self.raw.trim());
        }

        let mut parts: Vec<String> = Vec::new();
        if let Some(year) = self.year {
            parts.push(year.to_string());
        }
        parts.extend(self.make.iter().cloned());
        parts.extend(self.model.iter().cloned());
        parts.extend(
            self.extra
                .iter()
                .map(|(key, value)| format!("{}={}", key, value_to_cell(value))),
        );
        if let Some(location) = &self.location {
            parts.push(format!("in {}", location));
        }

        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_from_json_response() {
        let query = StructuredQuery::from_response(
            r#"{"make":"Roadtrek","model":"CS Adventurous XL","year":2017,"location":"Texas"}"#,
        );

        assert_eq!(query.make.as_deref(), Some("Roadtrek"));
        assert_eq!(query.model.as_deref(), Some("CS Adventurous XL"));
        assert_eq!(query.year, Some(2017));
        assert_eq!(query.location.as_deref(), Some("Texas"));
        assert!(query.extra.is_empty());
        assert_eq!(query.to_string(), "2017 Roadtrek CS Adventurous XL in Texas");
    }

    #[test]
    fn test_string_year_and_extra_attributes() {
        let query = StructuredQuery::from_response(
            r#"{"make":"Roadtrek","year":"2017","mileage":30000}"#,
        );

        assert_eq!(query.year, Some(2017));
        assert_eq!(query.extra.get("mileage"), Some(&json!(30000)));
    }

    #[test]
    fn test_unparseable_response_passes_through() {
        let raw = "make: Roadtrek, year: 2017";
        let query = StructuredQuery::from_response(raw);

        assert!(query.is_empty());
        assert_eq!(query.raw, raw);
        assert_eq!(query.to_string(), raw);
    }

    #[test]
    fn test_fractional_year_kept_as_extra() {
        let query = StructuredQuery::from_response(r#"{"make":"Roadtrek","year":2017.0}"#);

        assert_eq!(query.year, None);
        assert_eq!(query.extra.get("year"), Some(&json!(2017.0)));
        assert_eq!(query.to_string(), "Roadtrek year=2017.0");
    }

    #[test]
    fn test_year_range_and_negative_year_kept_as_extra() {
        let range = StructuredQuery::from_response(r#"{"year":"2017-2018"}"#);
        assert_eq!(range.extra.get("year"), Some(&json!("2017-2018")));

        let negative = StructuredQuery::from_response(r#"{"year":-2017}"#);
        assert_eq!(negative.year, None);
        assert_eq!(negative.extra.get("year"), Some(&json!(-2017)));
    }

    #[test]
    fn test_null_year_is_absent() {
        let query = StructuredQuery::from_response(r#"{"make":"Roadtrek","year":null}"#);
        assert_eq!(query.year, None);
        assert!(query.extra.is_empty());
    }

    #[test]
    fn test_non_numeric_year_kept_as_extra() {
        let query = StructuredQuery::from_response(r#"{"year":["2017","2018"]}"#);
        assert_eq!(query.year, None);
        assert_eq!(query.extra.get("year"), Some(&json!(["2017", "2018"])));
    }
}
