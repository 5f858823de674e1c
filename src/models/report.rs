// file: src/models/report.rs
// description: terminal artifacts of a pipeline run and the run report
// reference: internal data structures

use super::{ExtractedData, SearchResultSet, StructuredQuery};
use crate::pipeline::{PipelineState, PipelineStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub text: String,
}

impl Summary {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: Vec<String>,
}

/// Everything a completed run produced, in stage order.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub query: String,
    pub decomposed: StructuredQuery,
    pub search_results: SearchResultSet,
    pub extracted: ExtractedData,
    pub summary: Summary,
    pub artifact: ExportArtifact,
    pub state: PipelineState,
    pub stats: PipelineStats,
}

impl PipelineReport {
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
