// file: src/models/extracted.rs
// description: extracted field records consumed by summarization and export
// reference: internal data structures

use crate::error::{PipelineError, Result};
use crate::utils::json::{extract_json, value_to_cell};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Field name a non-json extraction response is stored under.
pub const RAW_FIELD: &str = "extracted";

/// One row of extracted data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedRecord(pub BTreeMap<String, Value>);

impl ExtractedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn cell(&self, field: &str) -> String {
        self.0.get(field).map(value_to_cell).unwrap_or_default()
    }
}

impl From<Map<String, Value>> for ExtractedRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedData {
    pub raw: String,
    pub records: Vec<ExtractedRecord>,
    /// Field names announced by a response that carried no rows, e.g. `{"price": []}`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header: Vec<String>,
}

impl ExtractedData {
    pub fn from_records(records: Vec<ExtractedRecord>) -> Self {
        Self {
            raw: String::new(),
            records,
            header: Vec::new(),
        }
    }

    /// Shapes an extraction response into records without rejecting it.
    ///
    /// - object of scalars: one record
    /// - object holding arrays: column form, one record per index, scalars
    ///   repeated on every row
    /// - array: one record per element (non-object elements under `value`)
    /// - anything else: one record with the raw text under [`RAW_FIELD`]
    ///
    /// Records without fields are dropped. Column form with only empty
    /// columns keeps its field names in `header` and yields no records.
    pub fn from_response(raw: impl Into<String>) -> Self {
        let raw = raw.into();

        let (mut records, header) = match extract_json(&raw) {
            Some(Value::Object(map)) => records_from_object(map),
            Some(Value::Array(items)) => {
                (items.into_iter().map(record_from_item).collect(), Vec::new())
            }
            _ => (
                vec![ExtractedRecord::new().with(RAW_FIELD, raw.trim())],
                Vec::new(),
            ),
        };
        records.retain(|record| !record.0.is_empty());

        Self {
            raw,
            records,
            header,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names shared by every record, or a serialization error when
    /// records disagree on their field sets.
    pub fn columns(&self) -> Result<Vec<String>> {
        let Some(first) = self.records.first() else {
            return Ok(self.header.clone());
        };

        let expected: BTreeSet<&String> = first.fields().collect();

        for (index, record) in self.records.iter().enumerate().skip(1) {
            let fields: BTreeSet<&String> = record.fields().collect();
            if fields != expected {
                let missing: Vec<&str> =
                    expected.difference(&fields).map(|f| f.as_str()).collect();
                let unexpected: Vec<&str> =
                    fields.difference(&expected).map(|f| f.as_str()).collect();
                return Err(PipelineError::Serialization(format!(
                    "record {} does not match the table shape (missing: [{}], unexpected: [{}])",
                    index,
                    missing.join(", "),
                    unexpected.join(", ")
                )));
            }
        }

        Ok(expected.into_iter().cloned().collect())
    }

    pub fn is_rectangular(&self) -> bool {
        self.columns().is_ok()
    }
}

fn records_from_object(map: Map<String, Value>) -> (Vec<ExtractedRecord>, Vec<String>) {
    let rows = map
        .values()
        .filter_map(|value| value.as_array().map(Vec::len))
        .max();

    let Some(rows) = rows else {
        return (vec![ExtractedRecord::from(map)], Vec::new());
    };

    if rows == 0 {
        let header: BTreeSet<String> = map.into_iter().map(|(field, _)| field).collect();
        return (Vec::new(), header.into_iter().collect());
    }

    let records = (0..rows)
        .map(|index| {
            let mut record = ExtractedRecord::new();
            for (field, value) in &map {
                match value {
                    Value::Array(column) => {
                        // Short columns leave the field out, which `columns()` reports.
                        if let Some(cell) = column.get(index) {
                            record.0.insert(field.clone(), cell.clone());
                        }
                    }
                    scalar => {
                        record.0.insert(field.clone(), scalar.clone());
                    }
                }
            }
            record
        })
        .collect();

    (records, Vec::new())
}

fn record_from_item(item: Value) -> ExtractedRecord {
    match item {
        Value::Object(map) => ExtractedRecord::from(map),
        other => ExtractedRecord::new().with("value", other),
    }
}

impl fmt::Display for ExtractedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(&self.records).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}
