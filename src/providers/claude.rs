// file: src/providers/claude.rs
// description: Anthropic messages API backend
// reference: https://docs.anthropic.com/en/api/messages

use super::base::{ModelClient, build_http_client, endpoint, read_json, send_error};
use crate::config::ClaudeConfig;
use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PROVIDER: &str = "claude";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

pub struct ClaudeClient {
    client: Client,
    config: ClaudeConfig,
}

impl ClaudeClient {
    pub fn new(config: ClaudeConfig, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            config,
        })
    }
}

fn collect_text(blocks: Vec<ContentBlock>) -> Option<String> {
    let text: Vec<String> = blocks
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.is_empty() { None } else { Some(text.join("")) }
}

fn response_text(body: MessagesResponse) -> Result<String> {
    collect_text(body.content)
        .ok_or_else(|| PipelineError::provider(PROVIDER, "no text content in response"))
}

#[async_trait]
impl ModelClient for ClaudeClient {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!("Requesting completion from Claude ({} chars)", prompt.len());

        let response = self
            .client
            .post(endpoint(&self.config.base_url, "messages"))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, e))?;

        let body: MessagesResponse = read_json(PROVIDER, response).await?;
        response_text(body)
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_text_skips_non_text_blocks() {
        let body: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"{\"make\":"},{"type":"tool_use"},{"type":"text","text":"\"Roadtrek\"}"}]}"#,
        )
        .unwrap();

        assert_eq!(
            collect_text(body.content).as_deref(),
            Some("{\"make\":\"Roadtrek\"}")
        );
    }

    #[test]
    fn test_collect_text_empty() {
        assert!(collect_text(Vec::new()).is_none());
    }

    #[test]
    fn test_tool_only_response_is_provider_error() {
        let body: MessagesResponse =
            serde_json::from_str(r#"{"content":[{"type":"tool_use","id":"t1"}]}"#).unwrap();

        let err = response_text(body).unwrap_err();
        assert!(err.is_provider());
        assert_eq!(
            err.to_string(),
            "Provider claude failed: no text content in response"
        );
    }
}
