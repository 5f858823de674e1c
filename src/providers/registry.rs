// file: src/providers/registry.rs
// description: resolves provider identifiers into freshly constructed model clients
// reference: factory pattern over the closed provider set

use super::base::ModelClient;
use super::claude::ClaudeClient;
use super::local::LocalClient;
use super::openai::OpenAiClient;
use crate::config::Config;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    Claude,
    Local,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [ProviderId::OpenAi, ProviderId::Claude, ProviderId::Local];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::Claude => "claude",
            ProviderId::Local => "local",
        }
    }

    pub fn is_hosted(&self) -> bool {
        !matches!(self, ProviderId::Local)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = PipelineError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderId::OpenAi),
            "claude" => Ok(ProviderId::Claude),
            "local" => Ok(ProviderId::Local),
            other => Err(PipelineError::Config(format!(
                "unknown provider '{}'. Supported: openai, claude, local",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub id: ProviderId,
    pub hosted: bool,
    pub configured: bool,
    pub model: Option<String>,
}

/// Maps provider identifiers to client constructors. Holds configuration only;
/// every `resolve` builds a new client.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    config: Config,
}

impl ProviderRegistry {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn resolve_str(&self, raw: &str) -> Result<Arc<dyn ModelClient>> {
        self.resolve(ProviderId::from_str(raw)?)
    }

    pub fn resolve(&self, id: ProviderId) -> Result<Arc<dyn ModelClient>> {
        let timeout = self.config.http.timeout_secs;
        let providers = &self.config.providers;

        debug!("Resolving provider {}", id);

        let client: Arc<dyn ModelClient> = match id {
            ProviderId::OpenAi => {
                let section = providers.openai.clone().ok_or_else(|| missing_section(id))?;
                Arc::new(OpenAiClient::new(section, timeout)?)
            }
            ProviderId::Claude => {
                let section = providers.claude.clone().ok_or_else(|| missing_section(id))?;
                Arc::new(ClaudeClient::new(section, timeout)?)
            }
            ProviderId::Local => {
                let section = providers.local.clone().ok_or_else(|| missing_section(id))?;
                Arc::new(LocalClient::new(section, timeout)?)
            }
        };

        Ok(client)
    }

    pub fn available(&self) -> Vec<ProviderStatus> {
        let providers = &self.config.providers;

        ProviderId::ALL
            .iter()
            .map(|&id| {
                let model = match id {
                    ProviderId::OpenAi => providers.openai.as_ref().map(|c| c.model.clone()),
                    ProviderId::Claude => providers.claude.as_ref().map(|c| c.model.clone()),
                    ProviderId::Local => providers.local.as_ref().map(|c| c.label().to_string()),
                };

                ProviderStatus {
                    id,
                    hosted: id.is_hosted(),
                    configured: self.config.is_configured(id),
                    model,
                }
            })
            .collect()
    }
}

fn missing_section(id: ProviderId) -> PipelineError {
    PipelineError::Config(format!("provider {} has no [providers.{}] section", id, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(raw: &str) -> ProviderRegistry {
        ProviderRegistry::new(Config::from_toml_str(raw).unwrap())
    }

    const ALL_PROVIDERS: &str = r#"
        [providers.openai]
        api_key = "sk-openai"
        model = "gpt-4o-mini"

        [providers.claude]
        api_key = "sk-claude"

        [providers.local]
        model_path = "models/llama.gguf"
    "#;

    #[test]
    fn test_resolve_every_recognized_provider() {
        let registry = registry(ALL_PROVIDERS);

        for id in ProviderId::ALL {
            let client = registry.resolve(id).unwrap();
            assert_eq!(client.provider_name(), id.as_str());
        }
    }

    #[test]
    fn test_resolve_unknown_provider_is_config_error() {
        let registry = registry(ALL_PROVIDERS);

        for raw in ["gemini", "", "open-ai", "llama"] {
            let err = registry.resolve_str(raw).err().unwrap();
            assert!(err.is_config(), "{raw} should be a configuration error");
        }
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = registry(ALL_PROVIDERS);
        let client = registry.resolve_str("Claude").unwrap();
        assert_eq!(client.model_name(), "claude-3-5-sonnet-latest");
    }

    #[test]
    fn test_resolve_unconfigured_provider_is_config_error() {
        let raw = r#"
            [providers.openai]
            api_key = "sk-openai"

            [providers.claude]
            api_key = "sk-claude"
        "#;

        let err = registry(raw).resolve(ProviderId::Local).err().unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn test_available_reports_configuration() {
        let raw = r#"
            [providers.openai]
            api_key = "sk-openai"

            [providers.claude]
            api_key = "sk-claude"
        "#;

        let statuses = registry(raw).available();
        assert_eq!(statuses.len(), 3);

        let local = statuses.iter().find(|s| s.id == ProviderId::Local).unwrap();
        assert!(!local.configured);
        assert!(!local.hosted);
        assert!(local.model.is_none());

        let openai = statuses.iter().find(|s| s.id == ProviderId::OpenAi).unwrap();
        assert!(openai.configured);
        assert_eq!(openai.model.as_deref(), Some("gpt-4o-mini"));
    }
}
