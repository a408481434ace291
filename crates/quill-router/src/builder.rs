use std::sync::Arc;

use quill_context::{ContextStrategy, DefaultContextStrategy};
use quill_llm::ChatClient;
use quill_persist::{DraftService, DraftStore, Stores, ThreadService};
use quill_types::{LLMConfig, RouterConfig};

use crate::classifier::IntentClassifier;
use crate::error::TurnError;
use crate::policy::{DefaultQuestionPolicy, QuestionPolicy};
use crate::streamer::ResponseStreamer;
use crate::turn::TurnPipeline;

const DEFAULT_MAX_HISTORY_TOKENS: usize = 8_000;

/// Builder for constructing a TurnPipeline with optional components
pub struct TurnPipelineBuilder {
    llm_client: Option<Arc<dyn ChatClient>>,
    stores: Option<Stores>,
    draft_store: Option<Arc<dyn DraftStore>>,
    context: Option<Arc<dyn ContextStrategy>>,
    policy: Arc<dyn QuestionPolicy>,
    llm_config: LLMConfig,
    router_config: RouterConfig,
    max_history_tokens: usize,
}

impl TurnPipelineBuilder {
    pub fn new() -> Self {
        Self {
            llm_client: None,
            stores: None,
            draft_store: None,
            context: None,
            policy: Arc::new(DefaultQuestionPolicy),
            llm_config: LLMConfig::default(),
            router_config: RouterConfig::default(),
            max_history_tokens: DEFAULT_MAX_HISTORY_TOKENS,
        }
    }

    pub fn llm_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.llm_client = Some(client);
        self
    }

    pub fn stores(mut self, stores: Stores) -> Self {
        self.stores = Some(stores);
        self
    }

    /// Use a different draft store than the one in `stores`
    pub fn draft_store(mut self, store: Arc<dyn DraftStore>) -> Self {
        self.draft_store = Some(store);
        self
    }

    pub fn context_strategy(mut self, strategy: Arc<dyn ContextStrategy>) -> Self {
        self.context = Some(strategy);
        self
    }

    pub fn question_policy(mut self, policy: Arc<dyn QuestionPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn llm_config(mut self, config: LLMConfig) -> Self {
        self.llm_config = config;
        self
    }

    pub fn router_config(mut self, config: RouterConfig) -> Self {
        self.router_config = config;
        self
    }

    pub fn max_history_tokens(mut self, tokens: usize) -> Self {
        self.max_history_tokens = tokens;
        self
    }

    pub fn build(self) -> Result<TurnPipeline, TurnError> {
        let client = self
            .llm_client
            .ok_or_else(|| TurnError::Config("LLM client is required".to_string()))?;
        let stores = self
            .stores
            .ok_or_else(|| TurnError::Config("stores are required".to_string()))?;
        if self.router_config.window_start > self.router_config.window_end {
            return Err(TurnError::Config(
                "router window_start must not exceed window_end".to_string(),
            ));
        }

        let context = match self.context {
            Some(context) => context,
            None => Arc::new(DefaultContextStrategy::new(self.max_history_tokens)?),
        };
        let drafts = self.draft_store.unwrap_or_else(|| stores.drafts.clone());

        Ok(TurnPipeline {
            threads: ThreadService::new(stores.threads.clone()),
            thread_store: stores.threads.clone(),
            drafts: DraftService::new(stores.threads.clone(), drafts),
            classifier: IntentClassifier::new(client.clone(), self.llm_config.classifier_model.clone()),
            context,
            streamer: ResponseStreamer::new(client, self.llm_config.model.clone())
                .with_max_tokens(self.llm_config.max_tokens),
            policy: self.policy,
            llm_config: self.llm_config,
            config: self.router_config,
        })
    }
}

impl Default for TurnPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
