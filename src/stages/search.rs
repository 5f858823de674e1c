// file: src/stages/search.rs
// description: search stage; asks the model for search queries, then returns a placeholder result
// reference: single model call per stage

use super::{Stage, StageKind, invoke_model};
use crate::error::Result;
use crate::models::{SearchRecord, SearchResultSet, StructuredQuery};
use crate::providers::ModelClient;
use crate::utils::PromptTemplate;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

pub struct SearchStage {
    client: Arc<dyn ModelClient>,
    template: PromptTemplate,
}

impl SearchStage {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            template: PromptTemplate::new(PromptTemplate::SEARCH),
        }
    }
}

#[async_trait]
impl Stage for SearchStage {
    type Input = StructuredQuery;
    type Output = SearchResultSet;

    fn kind(&self) -> StageKind {
        StageKind::Search
    }

    async fn run(&self, query: &StructuredQuery) -> Result<SearchResultSet> {
        let prompt = self.template.render(&query.to_string());
        let generated_queries = invoke_model(self.kind(), self.client.as_ref(), &prompt).await?;

        // TODO: run generated_queries against a web search backend; retrieval is not implemented yet.
        warn!("Web search is not implemented; returning a placeholder result");

        Ok(SearchResultSet {
            generated_queries,
            results: vec![SearchRecord::synthetic(format!("Result for {}", query))],
        })
    }
}
