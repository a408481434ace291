use quill_types::{Channel, Intent, RouterConfig, TurnEvent};
use std::sync::Arc;
use tracing::debug;

use crate::policy::QuestionPolicy;

/// Where the stream is currently being sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    /// Mirrored to the draft preview until the question check runs
    Undecided,
    /// Decided as content
    Draft,
    /// Chat transcript; terminal
    Conversation,
}

impl RouteState {
    pub fn channel(&self) -> Channel {
        match self {
            Self::Undecided | Self::Draft => Channel::Draft,
            Self::Conversation => Channel::Conversation,
        }
    }
}

/// Final routing decision for a fully consumed stream
#[derive(Debug, Clone, PartialEq)]
pub struct RouteOutcome {
    pub text: String,
    pub state: RouteState,
    /// Reroute events raised at close, emitted before the final delta
    pub pending: Vec<TurnEvent>,
}

impl RouteOutcome {
    pub fn channel(&self) -> Channel {
        self.state.channel()
    }

    /// Whether this outcome should be stored as a draft version
    pub fn produces_draft(&self) -> bool {
        self.channel() == Channel::Draft && !self.text.trim().is_empty()
    }

    pub fn final_delta(&self) -> TurnEvent {
        TurnEvent::Delta {
            content: String::new(),
            channel: self.channel(),
            is_final: true,
        }
    }

    /// Everything still owed to the consumer, ending with the final delta
    pub fn closing_events(&self) -> Vec<TurnEvent> {
        let mut events = self.pending.clone();
        events.push(self.final_delta());
        events
    }
}

/// Per-stream channel state machine
///
/// Draft and edit streams start `Undecided`. The question policy runs once,
/// when the accumulated length first reaches `window_start` characters, and
/// only if it is still below `window_end`. A stream that ends before reaching
/// the window is checked once at close instead.
pub struct StreamRouter {
    state: RouteState,
    text: String,
    chars: usize,
    evaluated: bool,
    window_start: usize,
    window_end: usize,
    policy: Arc<dyn QuestionPolicy>,
}

impl StreamRouter {
    pub fn new(intent: Intent, policy: Arc<dyn QuestionPolicy>, config: &RouterConfig) -> Self {
        let state = if intent.produces_content() {
            RouteState::Undecided
        } else {
            RouteState::Conversation
        };

        Self {
            state,
            text: String::new(),
            chars: 0,
            evaluated: false,
            window_start: config.window_start,
            window_end: config.window_end,
            policy,
        }
    }

    pub fn state(&self) -> RouteState {
        self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Feed one chunk and get the events to emit, in order
    pub fn push(&mut self, chunk: &str) -> Vec<TurnEvent> {
        if chunk.is_empty() {
            return Vec::new();
        }

        self.text.push_str(chunk);
        self.chars += chunk.chars().count();

        match self.state {
            RouteState::Draft => vec![TurnEvent::delta(chunk, Channel::Draft)],
            RouteState::Conversation => vec![TurnEvent::delta(chunk, Channel::Conversation)],
            RouteState::Undecided => self.push_undecided(chunk),
        }
    }

    fn push_undecided(&mut self, chunk: &str) -> Vec<TurnEvent> {
        if self.evaluated || self.chars < self.window_start {
            return vec![TurnEvent::delta(chunk, Channel::Draft)];
        }

        if self.chars < self.window_end {
            if let Some(events) = self.evaluate() {
                return events;
            }
        } else {
            self.evaluated = true;
        }

        debug!(chars = self.chars, "Stream decided as draft");
        self.state = RouteState::Draft;
        vec![TurnEvent::delta(chunk, Channel::Draft)]
    }

    /// Run the question check; `Some` carries the reroute events
    fn evaluate(&mut self) -> Option<Vec<TurnEvent>> {
        self.evaluated = true;
        if !self.policy.is_question(&self.text) {
            return None;
        }

        debug!(chars = self.chars, "Stream rerouted to conversation");
        self.state = RouteState::Conversation;
        Some(vec![
            TurnEvent::ClearDraftPreview,
            TurnEvent::delta(self.text.clone(), Channel::Conversation),
        ])
    }

    /// Close the stream
    ///
    /// A stream still undecided gets its one question check now; if it passes
    /// it counts as a draft.
    pub fn finish(mut self) -> RouteOutcome {
        let mut pending = Vec::new();
        if self.state == RouteState::Undecided {
            if !self.evaluated && !self.text.trim().is_empty() {
                pending = self.evaluate().unwrap_or_default();
            }
            if self.state == RouteState::Undecided {
                self.state = RouteState::Draft;
            }
        }

        RouteOutcome {
            text: self.text,
            state: self.state,
            pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::DefaultQuestionPolicy;

    fn router(intent: Intent) -> StreamRouter {
        StreamRouter::new(intent, Arc::new(DefaultQuestionPolicy), &RouterConfig::default())
    }

    fn collect(router: &mut StreamRouter, chunks: &[&str]) -> Vec<TurnEvent> {
        chunks.iter().flat_map(|c| router.push(c)).collect()
    }

    #[test]
    fn test_non_content_intents_stay_in_conversation() {
        let mut r = router(Intent::Ideate);
        let events = collect(&mut r, &["Here are ", "three ideas"]);
        assert!(events
            .iter()
            .all(|e| matches!(e, TurnEvent::Delta { channel: Channel::Conversation, .. })));
        assert_eq!(r.finish().channel(), Channel::Conversation);
    }

    #[test]
    fn test_question_reroutes_once_with_replay() {
        let mut r = router(Intent::Draft);
        let first = "Can you tell me more about X? ";
        let second = "I want to get the audience and tone right for you.";
        let events = collect(&mut r, &[first, second, " Thanks!"]);

        assert_eq!(events[0], TurnEvent::delta(first, Channel::Draft));
        assert_eq!(events[1], TurnEvent::ClearDraftPreview);
        assert_eq!(
            events[2],
            TurnEvent::delta(format!("{}{}", first, second), Channel::Conversation)
        );
        assert_eq!(events[3], TurnEvent::delta(" Thanks!", Channel::Conversation));
        assert_eq!(events.len(), 4);

        let outcome = r.finish();
        assert_eq!(outcome.state, RouteState::Conversation);
        assert!(!outcome.produces_draft());
    }

    #[test]
    fn test_content_decided_as_draft() {
        let mut r = router(Intent::Edit);
        let text = "Excited to share our Q3 results! Revenue grew 40% and we welcomed 12 new teammates. ";
        let events = collect(&mut r, &[text, "Onward."]);

        assert!(events
            .iter()
            .all(|e| matches!(e, TurnEvent::Delta { channel: Channel::Draft, .. })));
        assert_eq!(r.state(), RouteState::Draft);
        assert!(r.finish().produces_draft());
    }

    #[test]
    fn test_window_jumped_by_big_chunk() {
        let mut r = router(Intent::Draft);
        let big = format!("What a quarter? {}", "x".repeat(220));
        let events = collect(&mut r, &[&big]);

        assert_eq!(events, vec![TurnEvent::delta(big.clone(), Channel::Draft)]);
        assert_eq!(r.state(), RouteState::Draft);
    }

    #[test]
    fn test_never_reevaluated() {
        let mut r = router(Intent::Draft);
        collect(&mut r, &[&"a".repeat(60)]);
        assert_eq!(r.state(), RouteState::Draft);

        let events = collect(&mut r, &[" could you clarify?"]);
        assert_eq!(events, vec![TurnEvent::delta(" could you clarify?", Channel::Draft)]);
        assert_eq!(r.state(), RouteState::Draft);
    }

    #[test]
    fn test_short_undecided_stream_is_draft() {
        let mut r = router(Intent::Draft);
        collect(&mut r, &["Short post."]);
        assert_eq!(r.state(), RouteState::Undecided);

        let outcome = r.finish();
        assert_eq!(outcome.state, RouteState::Draft);
        assert_eq!(outcome.text, "Short post.");
        assert_eq!(
            outcome.final_delta(),
            TurnEvent::Delta {
                content: String::new(),
                channel: Channel::Draft,
                is_final: true
            }
        );
    }

    #[test]
    fn test_short_question_rerouted_at_close() {
        let mut r = router(Intent::Draft);
        let text = "Can you tell me more about X?";
        let events = collect(&mut r, &["Can you tell ", "me more about X?"]);
        assert!(events
            .iter()
            .all(|e| matches!(e, TurnEvent::Delta { channel: Channel::Draft, .. })));

        let outcome = r.finish();
        assert_eq!(outcome.state, RouteState::Conversation);
        assert!(!outcome.produces_draft());
        assert_eq!(
            outcome.closing_events(),
            vec![
                TurnEvent::ClearDraftPreview,
                TurnEvent::delta(text, Channel::Conversation),
                TurnEvent::Delta {
                    content: String::new(),
                    channel: Channel::Conversation,
                    is_final: true
                },
            ]
        );
    }

    #[test]
    fn test_short_content_has_no_pending_events() {
        let mut r = router(Intent::Edit);
        collect(&mut r, &["Big news: we shipped."]);
        let outcome = r.finish();
        assert!(outcome.pending.is_empty());
        assert_eq!(outcome.closing_events().len(), 1);
    }

    #[test]
    fn test_empty_stream_produces_nothing() {
        let mut r = router(Intent::Draft);
        assert!(r.push("").is_empty());
        assert!(!r.finish().produces_draft());
    }

    #[test]
    fn test_window_counts_characters_not_bytes() {
        let mut r = router(Intent::Draft);
        // 30 two-byte chars: 60 bytes but only 30 characters
        collect(&mut r, &[&"é".repeat(30)]);
        assert_eq!(r.state(), RouteState::Undecided);
    }
}
