use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Model used for streamed generation
    pub model: String,
    /// Model used for intent classification
    pub classifier_model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LLMConfig {
    pub fn new(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            classifier_model: model.clone(),
            model,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_classifier_model(mut self, model: impl Into<String>) -> Self {
        self.classifier_model = model.into();
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            classifier_model: "gpt-4o-mini".to_string(),
            temperature: Some(0.7),
            max_tokens: None,
        }
    }
}

/// Tuning for the stream router and turn pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Accumulated length (chars) at which the question check may run
    pub window_start: usize,
    /// Accumulated length (chars) past which the check is skipped
    pub window_end: usize,
    /// Capacity of the per-turn event channel
    pub event_buffer: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            window_start: 50,
            window_end: 200,
            event_buffer: 256,
        }
    }
}
