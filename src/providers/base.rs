// file: src/providers/base.rs
// description: uniform text-in/text-out contract shared by every model backend
// reference: https://docs.rs/async-trait

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// A ready-to-invoke model backend.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends one instruction and returns the model's raw text response.
    async fn invoke(&self, prompt: &str) -> Result<String>;

    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;
}

#[async_trait]
impl ModelClient for Arc<dyn ModelClient> {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        (**self).invoke(prompt).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

pub(crate) fn build_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PipelineError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Turns a non-success status into a provider error carrying the response body.
pub(crate) async fn read_json<T: DeserializeOwned>(provider: &str, response: Response) -> Result<T> {
    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(PipelineError::provider(
            provider,
            format!("request failed with status {}: {}", status, error_text),
        ));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| PipelineError::provider(provider, format!("failed to parse response: {}", e)))
}

pub(crate) fn send_error(provider: &str, err: reqwest::Error) -> PipelineError {
    let kind = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    PipelineError::provider(provider, format!("{}: {}", kind, err))
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
