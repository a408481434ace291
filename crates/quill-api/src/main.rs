use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quill_api::{build_router, config::Config, state::AppState};
use quill_llm::{ClientFactory, OpenAIConfig, ProviderConfig};
use quill_persist::PersistClientBuilder;
use quill_router::TurnPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Quill API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    tracing::info!("Initializing LLM client");
    let mut openai = OpenAIConfig::new(config.openai_api_key.clone());
    if let Some(base_url) = &config.llm.base_url {
        openai = openai.with_base_url(base_url.clone());
    }
    let llm_client = ClientFactory::create_chat_client(ProviderConfig::OpenAI(openai))?;

    tracing::info!(backend = ?config.storage.backend, "Initializing storage");
    let mut persist = PersistClientBuilder::new()
        .backend(config.storage.backend)
        .database(config.storage.database.clone());
    if let Some(uri) = &config.mongodb_uri {
        persist = persist.mongodb_uri(uri.clone());
    }
    let stores = persist.build().await?;

    tracing::info!("Initializing turn pipeline");
    let pipeline = TurnPipeline::builder()
        .llm_client(llm_client)
        .stores(stores.clone())
        .llm_config(config.llm.clone().into())
        .router_config(config.router.clone())
        .max_history_tokens(config.llm.max_history_tokens)
        .build()?;

    let state = Arc::new(AppState::new(config.clone(), stores, pipeline));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
