// file: src/stages/export.rs
// description: final stage; writes extracted data as a table without any model call
// reference: pure data transform

use super::{Stage, StageKind};
use crate::error::Result;
use crate::exporter::CsvExporter;
use crate::models::{ExportArtifact, ExtractedData};
use async_trait::async_trait;
use std::path::PathBuf;

pub struct ExportStage {
    exporter: CsvExporter,
}

impl ExportStage {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            exporter: CsvExporter::new(output_path),
        }
    }

    pub fn exporter(&self) -> &CsvExporter {
        &self.exporter
    }
}

#[async_trait]
impl Stage for ExportStage {
    type Input = ExtractedData;
    type Output = ExportArtifact;

    fn kind(&self) -> StageKind {
        StageKind::Export
    }

    async fn run(&self, data: &ExtractedData) -> Result<ExportArtifact> {
        self.exporter.export(data)
    }
}
