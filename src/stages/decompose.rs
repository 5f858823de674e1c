// file: src/stages/decompose.rs
// description: breaks a free-text query into structured vehicle attributes
// reference: single model call per stage

use super::{Stage, StageKind, invoke_model};
use crate::error::Result;
use crate::models::StructuredQuery;
use crate::providers::ModelClient;
use crate::utils::PromptTemplate;
use async_trait::async_trait;
use std::sync::Arc;

pub struct DecomposeStage {
    client: Arc<dyn ModelClient>,
    template: PromptTemplate,
}

impl DecomposeStage {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            template: PromptTemplate::new(PromptTemplate::DECOMPOSE),
        }
    }
}

#[async_trait]
impl Stage for DecomposeStage {
    type Input = str;
    type Output = StructuredQuery;

    fn kind(&self) -> StageKind {
        StageKind::Decompose
    }

    async fn run(&self, query: &str) -> Result<StructuredQuery> {
        let prompt = self.template.render(query);
        let response = invoke_model(self.kind(), self.client.as_ref(), &prompt).await?;
        Ok(StructuredQuery::from_response(response))
    }
}
