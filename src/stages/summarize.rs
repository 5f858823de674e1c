// file: src/stages/summarize.rs
// description: consolidates extracted data into a free-text summary
// reference: single model call per stage

use super::{Stage, StageKind, invoke_model};
use crate::error::Result;
use crate::models::{ExtractedData, Summary};
use crate::providers::ModelClient;
use crate::utils::PromptTemplate;
use async_trait::async_trait;
use std::sync::Arc;

pub struct SummarizeStage {
    client: Arc<dyn ModelClient>,
    template: PromptTemplate,
}

impl SummarizeStage {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            template: PromptTemplate::new(PromptTemplate::SUMMARIZE),
        }
    }
}

#[async_trait]
impl Stage for SummarizeStage {
    type Input = ExtractedData;
    type Output = Summary;

    fn kind(&self) -> StageKind {
        StageKind::Summarize
    }

    async fn run(&self, data: &ExtractedData) -> Result<Summary> {
        let prompt = self.template.render(&data.to_string());
        let response = invoke_model(self.kind(), self.client.as_ref(), &prompt).await?;
        Ok(Summary::new(response))
    }
}
