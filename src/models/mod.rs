// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod extracted;
pub mod query;
pub mod report;
pub mod search_result;

pub use extracted::{ExtractedData, ExtractedRecord};
pub use query::StructuredQuery;
pub use report::{ExportArtifact, PipelineReport, Summary};
pub use search_result::{SearchRecord, SearchResultSet};
