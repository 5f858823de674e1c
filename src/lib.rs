// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod config;
pub mod error;
pub mod exporter;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod stages;
pub mod utils;

pub use config::{Config, ExportConfig, HttpConfig, ProvidersConfig, StageBindings};
pub use error::{PipelineError, Result};
pub use exporter::CsvExporter;
pub use models::{
    ExportArtifact, ExtractedData, ExtractedRecord, PipelineReport, SearchRecord,
    SearchResultSet, StructuredQuery, Summary,
};
pub use pipeline::{
    NoopObserver, PipelineCoordinator, PipelineObserver, PipelineState, PipelineStats,
    ProgressTracker, StageArtifact, StageClients,
};
pub use providers::{ModelClient, ProviderId, ProviderRegistry, ProviderStatus};
pub use stages::{Stage, StageKind};
pub use utils::{PromptTemplate, Validator};
