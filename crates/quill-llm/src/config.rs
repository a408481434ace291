// Configuration layer for provider-agnostic LLM client creation

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{LlmError, LlmResult};

/// Type of LLM provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderType {
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
    /// Any endpoint speaking the OpenAI chat-completions protocol
    #[serde(rename = "openai_compatible")]
    OpenAICompatible,
}

/// Configuration for OpenAI-style providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    pub api_key: String,
    /// Base URL (defaults to https://api.openai.com/v1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl OpenAIConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Complete provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    #[serde(rename = "openai")]
    OpenAI(OpenAIConfig),
    #[serde(rename = "openai_compatible")]
    OpenAICompatible(OpenAIConfig),
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::OpenAI(OpenAIConfig::new(api_key))
    }

    pub fn openai_compatible(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::OpenAICompatible(OpenAIConfig::new(api_key).with_base_url(base_url))
    }

    pub fn provider_type(&self) -> ProviderType {
        match self {
            Self::OpenAI(_) => ProviderType::OpenAI,
            Self::OpenAICompatible(_) => ProviderType::OpenAICompatible,
        }
    }
}

/// Factory for creating LLM clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_chat_client(config: ProviderConfig) -> LlmResult<Arc<dyn crate::traits::ChatClient>> {
        match config {
            ProviderConfig::OpenAI(openai_config) => {
                let mut client = crate::openai::OpenAIClient::new(openai_config.api_key)?;
                if let Some(base_url) = openai_config.base_url {
                    client = client.with_base_url(base_url);
                }
                Ok(Arc::new(client))
            }
            ProviderConfig::OpenAICompatible(openai_config) => {
                let base_url = openai_config.base_url.ok_or_else(|| {
                    LlmError::Config("openai_compatible provider requires base_url".to_string())
                })?;
                let client = crate::openai::OpenAIClient::new(openai_config.api_key)?
                    .with_base_url(base_url);
                Ok(Arc::new(client))
            }
        }
    }
}
