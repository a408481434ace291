use config::{builder::DefaultState, Config as ConfigLoader, ConfigBuilder, ConfigError, File};
use quill_persist::Backend;
use quill_types::RouterConfig;
use serde::Deserialize;
use std::path::Path;

/// Environment prefixes and the config section each one overrides
const ENV_SECTIONS: [(&str, &str); 5] = [
    ("SERVER_", "server"),
    ("LLM_", "llm"),
    ("LOG_", "logging"),
    ("STORAGE_", "storage"),
    ("ROUTER_", "router"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub router: RouterConfig,
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub mongodb_uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: Backend,
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            database: "quill".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub classifier_model: String,
    pub temperature: f32,
    /// History token budget per turn (NOT sent to the provider)
    pub max_history_tokens: usize,
    /// OpenAI-compatible endpoint; the public API when unset
    #[serde(default)]
    pub base_url: Option<String>,
}

impl From<LlmConfig> for quill_types::LLMConfig {
    fn from(config: LlmConfig) -> Self {
        quill_types::LLMConfig::new(config.model)
            .with_classifier_model(config.classifier_model)
            .with_temperature(config.temperature)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (SERVER_PORT, LLM_MODEL, LOG_LEVEL, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false));
        let builder = apply_env_overrides(builder, std::env::vars())?;

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secrets never live in TOML
        cfg.openai_api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ConfigError::Message("OPENAI_API_KEY environment variable is required".to_string())
        })?;
        cfg.mongodb_uri = std::env::var("MONGODB_URI").ok();
        if cfg.storage.backend == Backend::Mongodb && cfg.mongodb_uri.is_none() {
            return Err(ConfigError::Message(
                "MONGODB_URI environment variable is required for the mongodb backend".to_string(),
            ));
        }

        Ok(cfg)
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = ConfigLoader::builder().add_source(File::from(path.as_ref()));

        let config = builder.build()?;
        config.try_deserialize()
    }
}

/// Map `LLM_CLASSIFIER_MODEL=x` onto `llm.classifier_model = x`
fn apply_env_overrides(
    mut builder: ConfigBuilder<DefaultState>,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (key, value) in vars {
        let Some((section, field)) = ENV_SECTIONS
            .iter()
            .find_map(|(prefix, section)| key.strip_prefix(prefix).map(|field| (*section, field)))
        else {
            continue;
        };
        if field.is_empty() {
            continue;
        }
        builder = builder.set_override(format!("{}.{}", section, field.to_lowercase()), value)?;
    }
    Ok(builder)
}
