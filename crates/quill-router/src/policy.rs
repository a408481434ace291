use regex::Regex;
use std::sync::LazyLock;

/// Decides whether early model output is a clarifying question rather than content
pub trait QuestionPolicy: Send + Sync {
    fn is_question(&self, text: &str) -> bool;
}

static CLARIFYING_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:could you|can you|would you|do you|are you|before i|to help me|i need more|could i|please provide|please share|tell me more|(?:what|which|who|how)\s+(?:is|are|was|were|do|does|did|would|should|could|can|will|kind|type|sort|of))\b",
    )
    .unwrap()
});

// Requests aimed at the user, not calls to action aimed at readers
static INFO_REQUEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\bneed (?:a bit |some )?more (?:information|details|context)\b|\b(?:could|can|would) you (?:share|clarify|confirm|provide)\b|\bclarify (?:what|which|who|how|whether|if)\b|\blet me know (?:which|whether|if|what you(?:'d| would) like)\b)",
    )
    .unwrap()
});

/// Heuristic over punctuation, openers and information requests
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultQuestionPolicy;

impl QuestionPolicy for DefaultQuestionPolicy {
    fn is_question(&self, text: &str) -> bool {
        let text = text.trim();
        text.contains('?') || CLARIFYING_OPENER.is_match(text) || INFO_REQUEST.is_match(text)
    }
}
