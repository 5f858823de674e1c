// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::providers::ProviderId;
use crate::stages::StageKind;
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "VALUATION";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub stages: StageBindings,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    pub openai: Option<OpenAiConfig>,
    pub claude: Option<ClaudeConfig>,
    pub local: Option<LocalConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_url")]
    pub base_url: String,
    #[serde(default)]
    pub temperature: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClaudeConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_claude_model")]
    pub model: String,
    #[serde(default = "default_claude_url")]
    pub base_url: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalConfig {
    /// Label only. The llama.cpp server serves whichever model it was started with.
    #[serde(default)]
    pub model_path: String,
    #[serde(default = "default_local_url")]
    pub base_url: String,
    #[serde(default = "default_n_predict")]
    pub n_predict: u32,
    #[serde(default)]
    pub temperature: f64,
}

/// Which provider backs each model-driven stage.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StageBindings {
    #[serde(default = "default_claude_id")]
    pub decompose: String,
    #[serde(default = "default_openai_id")]
    pub search: String,
    #[serde(default = "default_claude_id")]
    pub extract: String,
    #[serde(default = "default_openai_id")]
    pub summarize: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_claude_model() -> String {
    "claude-3-5-sonnet-latest".to_string()
}

fn default_claude_url() -> String {
    "https://api.anthropic.com/v1".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_local_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_n_predict() -> u32 {
    512
}

fn default_claude_id() -> String {
    ProviderId::Claude.as_str().to_string()
}

fn default_openai_id() -> String {
    ProviderId::OpenAi.as_str().to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output.csv")
}

fn default_timeout_secs() -> u64 {
    120
}

impl LocalConfig {
    /// Name shown in logs and provider listings.
    pub fn label(&self) -> &str {
        let label = self.model_path.trim();
        if label.is_empty() { "llama.cpp" } else { label }
    }
}

impl Default for StageBindings {
    fn default() -> Self {
        Self {
            decompose: default_claude_id(),
            search: default_openai_id(),
            extract: default_claude_id(),
            summarize: default_openai_id(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StageBindings {
    pub fn provider_for(&self, stage: StageKind) -> Option<&str> {
        match stage {
            StageKind::Decompose => Some(&self.decompose),
            StageKind::Search => Some(&self.search),
            StageKind::Extract => Some(&self.extract),
            StageKind::Summarize => Some(&self.summarize),
            StageKind::Export => None,
        }
    }
}

impl Config {
    /// Reads the configuration file once at startup. A missing file is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        dotenv().ok();

        if !path.exists() {
            return Err(PipelineError::Config(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let mut config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.fill_api_keys(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Fills blank hosted-provider keys from `OPENAI_API_KEY` / `ANTHROPIC_API_KEY`.
    pub fn fill_api_keys<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(openai) = self.providers.openai.as_mut()
            && openai.api_key.trim().is_empty()
            && let Some(key) = lookup("OPENAI_API_KEY")
        {
            openai.api_key = key;
        }

        if let Some(claude) = self.providers.claude.as_mut()
            && claude.api_key.trim().is_empty()
            && let Some(key) = lookup("ANTHROPIC_API_KEY")
        {
            claude.api_key = key;
        }
    }

    pub fn is_configured(&self, provider: ProviderId) -> bool {
        match provider {
            ProviderId::OpenAi => self.providers.openai.is_some(),
            ProviderId::Claude => self.providers.claude.is_some(),
            ProviderId::Local => self.providers.local.is_some(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.http.timeout_secs == 0 {
            return Err(PipelineError::Config(
                "http.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(openai) = &self.providers.openai {
            require_key("providers.openai.api_key", &openai.api_key)?;
            require_url("providers.openai.base_url", &openai.base_url)?;
        }

        if let Some(claude) = &self.providers.claude {
            require_key("providers.claude.api_key", &claude.api_key)?;
            require_url("providers.claude.base_url", &claude.base_url)?;
            if claude.max_tokens == 0 {
                return Err(PipelineError::Config(
                    "providers.claude.max_tokens must be greater than 0".to_string(),
                ));
            }
        }

        if let Some(local) = &self.providers.local {
            require_url("providers.local.base_url", &local.base_url)?;
        }

        for stage in StageKind::MODEL_STAGES {
            let Some(raw) = self.stages.provider_for(stage) else {
                continue;
            };

            let provider = ProviderId::from_str(raw)?;
            if !self.is_configured(provider) {
                return Err(PipelineError::Config(format!(
                    "stage {} is bound to provider {} but [providers.{}] is missing",
                    stage, provider, provider
                )));
            }
        }

        Ok(())
    }
}

fn require_key(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PipelineError::Config(format!("missing required key {}", name)));
    }
    Ok(())
}

fn require_url(name: &str, value: &str) -> Result<()> {
    Validator::validate_url(value)
        .map_err(|e| PipelineError::Config(format!("{}: {}", name, e)))
}
