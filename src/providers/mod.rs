// file: src/providers/mod.rs
// description: model provider module exports and public api
// reference: internal module structure

pub mod base;
pub mod claude;
pub mod local;
pub mod openai;
pub mod registry;

pub use base::ModelClient;
pub use claude::ClaudeClient;
pub use local::LocalClient;
pub use openai::OpenAiClient;
pub use registry::{ProviderId, ProviderRegistry, ProviderStatus};
