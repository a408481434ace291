use quill_llm::{ChatClient, ChatOptions, ChatRequest, LlmError, Message, ResponseFormat};
use quill_types::Intent;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

const CLASSIFIER_PROMPT: &str = "Classify the user's message to a social media writing \
assistant. Answer with one intent: 'draft' (write a new post), 'edit' (change an existing \
post), 'ideate' (brainstorm topics or angles), or 'feedback' (critique a post).";

#[derive(Debug, Deserialize)]
struct Classification {
    intent: String,
}

/// Labels a user message with an intent; never fails
#[derive(Clone)]
pub struct IntentClassifier {
    client: Arc<dyn ChatClient>,
    model: String,
}

impl IntentClassifier {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Classify `text`, falling back to `Intent::Draft` on any failure
    pub async fn classify(&self, text: &str) -> Intent {
        match self.try_classify(text).await {
            Ok(intent) => {
                debug!(intent = %intent, "Message classified");
                intent
            }
            Err(e) => {
                warn!(error = %e, "Intent classification failed, defaulting to draft");
                Intent::Draft
            }
        }
    }

    async fn try_classify(&self, text: &str) -> Result<Intent, LlmError> {
        let options = ChatOptions::new()
            .temperature(0.0)
            .response_format(ResponseFormat::json_schema("intent_classification", schema()));
        let request = ChatRequest::new(
            self.model.clone(),
            vec![Message::system(CLASSIFIER_PROMPT), Message::human(text)],
        )
        .with_options(options);

        let response = self.client.chat(request).await?;
        let content = response
            .content
            .ok_or_else(|| LlmError::Parse("empty classification response".to_string()))?;
        let parsed: Classification = serde_json::from_str(&content)?;

        parsed
            .intent
            .parse::<Intent>()
            .map_err(|e| LlmError::Parse(e.to_string()))
    }
}

fn schema() -> serde_json::Value {
    let labels: Vec<&str> = Intent::ALL.iter().map(Intent::as_str).collect();
    serde_json::json!({
        "type": "object",
        "properties": {
            "intent": { "type": "string", "enum": labels }
        },
        "required": ["intent"],
        "additionalProperties": false
    })
}
