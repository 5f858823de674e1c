// file: src/providers/local.rs
// description: local llama.cpp server backend
// reference: https://github.com/ggerganov/llama.cpp/tree/master/examples/server

use super::base::{ModelClient, build_http_client, endpoint, read_json, send_error};
use crate::config::LocalConfig;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const PROVIDER: &str = "local";

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    n_predict: u32,
    temperature: f64,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: String,
}

pub struct LocalClient {
    client: Client,
    config: LocalConfig,
}

impl LocalClient {
    pub fn new(config: LocalConfig, timeout_secs: u64) -> Result<Self> {
        info!(
            "Local provider initialized (model={}, url={})",
            config.label(),
            config.base_url
        );
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            config,
        })
    }
}

#[async_trait]
impl ModelClient for LocalClient {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let request = CompletionRequest {
            prompt,
            n_predict: self.config.n_predict,
            temperature: self.config.temperature,
            stream: false,
        };

        debug!("Requesting completion from local model ({} chars)", prompt.len());

        let response = self
            .client
            .post(endpoint(&self.config.base_url, "completion"))
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, e))?;

        let body: CompletionResponse = read_json(PROVIDER, response).await?;
        Ok(body.content)
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        self.config.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_model_path() {
        let request = CompletionRequest {
            prompt: "hi",
            n_predict: 16,
            temperature: 0.0,
            stream: false,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["prompt"], "hi");
        assert!(json.get("model").is_none());
    }

    #[test]
    fn test_model_name_falls_back_to_server_label() {
        let client = LocalClient::new(
            LocalConfig {
                model_path: String::new(),
                base_url: "http://localhost:8080".to_string(),
                n_predict: 16,
                temperature: 0.0,
            },
            5,
        )
        .unwrap();

        assert_eq!(client.model_name(), "llama.cpp");
    }
}
