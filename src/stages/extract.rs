// file: src/stages/extract.rs
// description: pulls structured fields out of search results
// reference: single model call per stage

use super::{Stage, StageKind, invoke_model};
use crate::error::Result;
use crate::models::{ExtractedData, SearchResultSet};
use crate::providers::ModelClient;
use crate::utils::PromptTemplate;
use async_trait::async_trait;
use std::sync::Arc;

pub struct ExtractStage {
    client: Arc<dyn ModelClient>,
    template: PromptTemplate,
}

impl ExtractStage {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            template: PromptTemplate::new(PromptTemplate::EXTRACT),
        }
    }
}

#[async_trait]
impl Stage for ExtractStage {
    type Input = SearchResultSet;
    type Output = ExtractedData;

    fn kind(&self) -> StageKind {
        StageKind::Extract
    }

    async fn run(&self, results: &SearchResultSet) -> Result<ExtractedData> {
        let prompt = self.template.render(&results.to_string());
        let response = invoke_model(self.kind(), self.client.as_ref(), &prompt).await?;
        Ok(ExtractedData::from_response(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchRecord;
    use crate::stages::testing::FixedClient;
    use serde_json::json;

    #[tokio::test]
    async fn test_extract_shapes_response() {
        let client = Arc::new(FixedClient::replying(r#"{"price": 45000}"#));
        let stage = ExtractStage::new(client.clone());
        let results = SearchResultSet {
            generated_queries: String::new(),
            results: vec![SearchRecord::synthetic("Result for Roadtrek")],
        };

        let data = stage.run(&results).await.unwrap();

        assert_eq!(data.records[0].get("price"), Some(&json!(45000)));
        assert_eq!(
            client.last_prompt().unwrap(),
            "Extract relevant information from: [Result for Roadtrek]"
        );
    }
}
