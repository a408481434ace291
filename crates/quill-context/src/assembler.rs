use quill_types::Intent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::templates::{
    DRAFT_TEMPLATE, EDIT_TEMPLATE, FEEDBACK_TEMPLATE, GENERIC_TEMPLATE, IDEATE_TEMPLATE,
};

/// Externally produced analytics and persona text
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextData {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub demographics: Option<String>,
    #[serde(default)]
    pub recent_posts: Option<String>,
    #[serde(default)]
    pub engagement_notes: Option<String>,
    /// Stored text of the draft being edited; filled by the turn pipeline
    #[serde(skip)]
    pub current_draft: Option<String>,
}

impl ContextData {
    /// Fields in prompt order with their section headings
    fn sections(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("Profile summary", self.summary.as_deref()),
            ("Audience demographics", self.demographics.as_deref()),
            ("Recent post examples", self.recent_posts.as_deref()),
            ("Engagement patterns", self.engagement_notes.as_deref()),
            ("Current draft", self.current_draft.as_deref()),
        ]
    }

    pub fn with_current_draft(mut self, content: impl Into<String>) -> Self {
        self.current_draft = Some(content.into());
        self
    }
}

/// Builds the system prompt for a turn; never performs I/O
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    templates: HashMap<Intent, String>,
    fallback: String,
}

impl ContextAssembler {
    pub fn new() -> Self {
        let templates = HashMap::from([
            (Intent::Draft, DRAFT_TEMPLATE.to_string()),
            (Intent::Edit, EDIT_TEMPLATE.to_string()),
            (Intent::Ideate, IDEATE_TEMPLATE.to_string()),
            (Intent::Feedback, FEEDBACK_TEMPLATE.to_string()),
        ]);
        Self {
            templates,
            fallback: GENERIC_TEMPLATE.to_string(),
        }
    }

    pub fn with_template(mut self, intent: Intent, template: impl Into<String>) -> Self {
        self.templates.insert(intent, template.into());
        self
    }

    pub fn template(&self, intent: Intent) -> &str {
        self.templates
            .get(&intent)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    pub fn assemble(&self, intent: Intent, data: &ContextData) -> String {
        let mut prompt = self.template(intent).trim_end().to_string();

        for (heading, value) in data.sections() {
            let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
                continue;
            };
            prompt.push_str("\n\n## ");
            prompt.push_str(heading);
            prompt.push('\n');
            prompt.push_str(value);
        }

        prompt
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new()
    }
}
