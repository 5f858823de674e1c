// file: src/pipeline/observer.rs
// description: hooks through which a caller watches intermediate artifacts as they are produced
// reference: observer pattern

use crate::error::PipelineError;
use crate::models::{ExportArtifact, ExtractedData, SearchResultSet, StructuredQuery, Summary};
use crate::stages::StageKind;
use std::time::Duration;

/// Borrowed view of whatever a stage just produced.
#[derive(Debug, Clone, Copy)]
pub enum StageArtifact<'a> {
    Decomposed(&'a StructuredQuery),
    SearchResults(&'a SearchResultSet),
    Extracted(&'a ExtractedData),
    Summary(&'a Summary),
    Exported(&'a ExportArtifact),
}

impl StageArtifact<'_> {
    pub fn stage(&self) -> StageKind {
        match self {
            StageArtifact::Decomposed(_) => StageKind::Decompose,
            StageArtifact::SearchResults(_) => StageKind::Search,
            StageArtifact::Extracted(_) => StageKind::Extract,
            StageArtifact::Summary(_) => StageKind::Summarize,
            StageArtifact::Exported(_) => StageKind::Export,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            StageArtifact::Decomposed(query) => query.to_string(),
            StageArtifact::SearchResults(results) => results.to_string(),
            StageArtifact::Extracted(data) => data.to_string(),
            StageArtifact::Summary(summary) => summary.to_string(),
            StageArtifact::Exported(artifact) => format!(
                "{} rows x {} columns to {}",
                artifact.rows,
                artifact.columns.len(),
                artifact.path.display()
            ),
        }
    }
}

pub trait PipelineObserver: Send + Sync {
    fn stage_started(&self, _stage: StageKind) {}

    fn stage_completed(&self, _artifact: StageArtifact<'_>, _elapsed: Duration) {}

    fn run_failed(&self, _stage: StageKind, _error: &PipelineError) {}
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}
