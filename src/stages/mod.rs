// file: src/stages/mod.rs
// description: pipeline stage contract, stage identities and shared model invocation
// reference: internal module structure

pub mod decompose;
pub mod export;
pub mod extract;
pub mod search;
pub mod summarize;

pub use decompose::DecomposeStage;
pub use export::ExportStage;
pub use extract::ExtractStage;
pub use search::SearchStage;
pub use summarize::SummarizeStage;

use crate::error::Result;
use crate::providers::ModelClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Decompose,
    Search,
    Extract,
    Summarize,
    Export,
}

impl StageKind {
    pub const ALL: [StageKind; 5] = [
        StageKind::Decompose,
        StageKind::Search,
        StageKind::Extract,
        StageKind::Summarize,
        StageKind::Export,
    ];

    /// Stages that call a model and therefore need a provider binding.
    pub const MODEL_STAGES: [StageKind; 4] = [
        StageKind::Decompose,
        StageKind::Search,
        StageKind::Extract,
        StageKind::Summarize,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Decompose => "decompose",
            StageKind::Search => "search",
            StageKind::Extract => "extract",
            StageKind::Summarize => "summarize",
            StageKind::Export => "export",
        }
    }

    /// 1-based position in the fixed stage order.
    pub fn position(&self) -> usize {
        match self {
            StageKind::Decompose => 1,
            StageKind::Search => 2,
            StageKind::Extract => 3,
            StageKind::Summarize => 4,
            StageKind::Export => 5,
        }
    }

    pub fn progress_label(&self) -> &'static str {
        match self {
            StageKind::Decompose => "Decomposing query...",
            StageKind::Search => "Performing search...",
            StageKind::Extract => "Extracting information...",
            StageKind::Summarize => "Summarizing information...",
            StageKind::Export => "Exporting results...",
        }
    }

    pub fn artifact_label(&self) -> &'static str {
        match self {
            StageKind::Decompose => "Decomposed Query",
            StageKind::Search => "Search Results",
            StageKind::Extract => "Extracted Data",
            StageKind::Summarize => "Summary",
            StageKind::Export => "Exported",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One step of the pipeline: transforms its input into the next artifact.
#[async_trait]
pub trait Stage: Send + Sync {
    type Input: ?Sized + Sync;
    type Output: Send;

    fn kind(&self) -> StageKind;

    async fn run(&self, input: &Self::Input) -> Result<Self::Output>;
}

/// Sends one prompt and hands back the raw response; failures pass through untouched.
pub(crate) async fn invoke_model(
    stage: StageKind,
    client: &dyn ModelClient,
    prompt: &str,
) -> Result<String> {
    debug!(
        stage = %stage,
        provider = client.provider_name(),
        model = client.model_name(),
        "prompt: {}",
        prompt
    );

    let response = client.invoke(prompt).await?;

    debug!(stage = %stage, "response ({} chars): {}", response.len(), response);
    Ok(response)
}
