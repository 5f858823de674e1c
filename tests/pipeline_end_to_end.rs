// file: tests/pipeline_end_to_end.rs
// description: end-to-end pipeline runs against deterministic stub model clients
// reference: integration tests over the public api

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::tempdir;
use valuation_agents::exporter::read_rows;
use valuation_agents::{
    ModelClient, PipelineCoordinator, PipelineError, PipelineState, Result, StageClients,
};

const QUERY: &str = "Find the price of a 2017 Roadtrek CS Adventurous XL in Texas";

struct StubClient {
    name: &'static str,
    response: &'static str,
}

#[async_trait]
impl ModelClient for StubClient {
    async fn invoke(&self, _prompt: &str) -> Result<String> {
        Ok(self.response.to_string())
    }

    fn provider_name(&self) -> &str {
        self.name
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// Echoes its prompt back, so every artifact is a pure function of the query.
struct EchoClient;

#[async_trait]
impl ModelClient for EchoClient {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        Ok(format!("echo: {}", prompt))
    }

    fn provider_name(&self) -> &str {
        "echo"
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

fn stub(name: &'static str, response: &'static str) -> Arc<dyn ModelClient> {
    Arc::new(StubClient { name, response })
}

fn valuation_clients() -> StageClients {
    StageClients {
        decompose: stub(
            "claude",
            r#"{"make":"Roadtrek","model":"CS Adventurous XL","year":2017,"location":"Texas"}"#,
        ),
        search: stub("openai", "2017 Roadtrek CS Adventurous XL price Texas"),
        extract: stub("claude", r#"{"price": 45000}"#),
        summarize: stub("openai", "A 2017 Roadtrek CS Adventurous XL sells for about $45,000 in Texas."),
    }
}

#[tokio::test]
async fn roadtrek_query_exports_single_price_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("output.csv");
    let coordinator = PipelineCoordinator::new(valuation_clients(), &path);

    let report = coordinator.run(QUERY).await.unwrap();

    assert_eq!(report.decomposed.make.as_deref(), Some("Roadtrek"));
    assert_eq!(report.decomposed.year, Some(2017));
    assert_eq!(report.search_results.len(), 1);
    assert_eq!(
        report.search_results.results[0].content,
        "Result for 2017 Roadtrek CS Adventurous XL in Texas"
    );
    assert_eq!(report.extracted.len(), 1);
    assert_eq!(
        report.summary.text,
        "A 2017 Roadtrek CS Adventurous XL sells for about $45,000 in Texas."
    );
    assert_eq!(report.state, PipelineState::Done);

    assert_eq!(report.artifact.path, path);
    assert_eq!(report.artifact.rows, 1);
    assert_eq!(report.artifact.columns, vec!["price".to_string()]);

    let rows = read_rows(&path).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("price").map(String::as_str), Some("45000"));
    assert_eq!(rows[0].len(), 1);
}

#[tokio::test]
async fn echo_clients_produce_identical_artifacts_across_runs() {
    let dir = tempdir().unwrap();
    let coordinator = PipelineCoordinator::new(
        StageClients::uniform(Arc::new(EchoClient)),
        dir.path().join("output.csv"),
    );

    let first = coordinator.run(QUERY).await.unwrap();
    let second = coordinator.run(QUERY).await.unwrap();

    assert_eq!(first.decomposed, second.decomposed);
    assert_eq!(first.search_results, second.search_results);
    assert_eq!(first.extracted, second.extracted);
    assert_eq!(first.summary, second.summary);
    assert_eq!(first.artifact, second.artifact);
    assert!(first.run_id != second.run_id);

    // Echoed prose has no json, so the raw text becomes the single extracted field.
    assert_eq!(first.extracted.records[0].fields().count(), 1);
    assert!(
        first
            .summary
            .text
            .starts_with("echo: Summarize the following data: ")
    );
}

#[tokio::test]
async fn report_serializes_every_artifact() {
    let dir = tempdir().unwrap();
    let coordinator =
        PipelineCoordinator::new(valuation_clients(), dir.path().join("output.csv"));

    let report = coordinator.run(QUERY).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["decomposed"]["location"], "Texas");
    assert_eq!(json["extracted"]["records"][0]["price"], 45000);
    assert_eq!(json["state"], "done");
    assert!(json["stats"]["stage_millis"]["export"].is_number());
}

#[tokio::test]
async fn unwritable_output_fails_before_any_model_call() {
    let dir = tempdir().unwrap();
    let coordinator = PipelineCoordinator::new(
        valuation_clients(),
        dir.path().join("missing").join("output.csv"),
    );

    let err = coordinator.run(QUERY).await.unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));
}
