use futures::StreamExt;
use quill_context::{ContextData, ContextStrategy};
use quill_persist::{DraftRevision, DraftService, NewMessage, NewVersion, Principal, ThreadService, ThreadStore};
use quill_types::{CompletedTurn, Intent, LLMConfig, RouterConfig, TurnEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::classifier::IntentClassifier;
use crate::error::TurnError;
use crate::policy::QuestionPolicy;
use crate::router::StreamRouter;
use crate::streamer::ResponseStreamer;

/// One user message to process
#[derive(Debug, Clone)]
pub struct TurnInput {
    pub thread_id: String,
    pub principal: Principal,
    pub content: String,
    pub context: ContextData,
}

/// Classify, stream, route and persist a chat turn
#[derive(Clone)]
pub struct TurnPipeline {
    pub(crate) threads: ThreadService,
    pub(crate) thread_store: Arc<dyn ThreadStore>,
    pub(crate) drafts: DraftService,
    pub(crate) classifier: IntentClassifier,
    pub(crate) context: Arc<dyn ContextStrategy>,
    pub(crate) streamer: ResponseStreamer,
    pub(crate) policy: Arc<dyn QuestionPolicy>,
    pub(crate) llm_config: LLMConfig,
    pub(crate) config: RouterConfig,
}

impl TurnPipeline {
    /// Create a builder for fluent construction
    pub fn builder() -> crate::builder::TurnPipelineBuilder {
        crate::builder::TurnPipelineBuilder::new()
    }

    /// Spawn the turn in the background and return its event receiver
    ///
    /// Dropping the receiver cancels the turn; a cancelled turn leaves
    /// drafts untouched.
    pub fn spawn_turn(&self, input: TurnInput) -> mpsc::Receiver<TurnEvent> {
        let (tx, rx) = mpsc::channel(self.config.event_buffer.max(1));
        let pipeline = self.clone();

        tokio::spawn(async move {
            let thread_id = input.thread_id.clone();
            match pipeline.execute(input, &tx).await {
                Ok(()) => {}
                Err(TurnError::Cancelled) => {
                    info!(thread_id = %thread_id, "Turn cancelled by consumer");
                }
                Err(e) => {
                    error!(thread_id = %thread_id, error = %e, "Turn failed");
                    let _ = tx
                        .send(TurnEvent::Error {
                            kind: e.kind(),
                            message: e.to_string(),
                        })
                        .await;
                }
            }
        });

        rx
    }

    async fn execute(&self, input: TurnInput, tx: &mpsc::Sender<TurnEvent>) -> Result<(), TurnError> {
        let thread = self
            .threads
            .owned_thread(&input.thread_id, &input.principal)
            .await?;

        let intent = self.classifier.classify(&input.content).await;
        let user_message = self
            .threads
            .append_message(NewMessage::user(&thread.id, input.content.clone()).with_intent(intent))
            .await?;

        let turn_id = uuid::Uuid::new_v4().to_string();
        info!(turn_id = %turn_id, thread_id = %thread.id, intent = %intent, "Turn started");
        emit(
            tx,
            TurnEvent::TurnStarted {
                turn_id,
                thread_id: thread.id.clone(),
                user_message_id: user_message.id.clone(),
                timestamp: chrono::Utc::now().timestamp_millis(),
            },
        )
        .await?;
        emit(tx, TurnEvent::Intent { intent }).await?;

        let mut context = input.context.clone();
        if intent == Intent::Edit {
            if let Some(current) = self.current_draft_text(&thread.id).await? {
                context = context.with_current_draft(current);
            }
        }

        let window = self
            .context
            .get_context_window(&thread.id, intent, &context, self.thread_store.as_ref())
            .await?;
        let mut stream = self
            .streamer
            .open(window.into_messages(), self.llm_config.temperature)
            .await?;
        let mut router = StreamRouter::new(intent, Arc::clone(&self.policy), &self.config);

        loop {
            let next = tokio::select! {
                _ = tx.closed() => return Err(TurnError::Cancelled),
                next = stream.next() => next,
            };
            let Some(chunk) = next else {
                break;
            };

            for event in router.push(&chunk?) {
                emit(tx, event).await?;
            }
        }

        let outcome = router.finish();
        for event in outcome.closing_events() {
            emit(tx, event).await?;
        }

        // The version is written last so it always has its parent message
        let assistant = self
            .threads
            .append_message(NewMessage::assistant(&thread.id, outcome.text.clone()).with_intent(intent))
            .await?;

        let revision = if outcome.produces_draft() {
            Some(
                self.store_draft(&thread.id, intent, &input.content, &outcome.text, &assistant.id)
                    .await?,
            )
        } else {
            None
        };

        info!(
            thread_id = %thread.id,
            message_id = %assistant.id,
            channel = ?outcome.channel(),
            draft_id = ?revision.as_ref().map(|r| r.draft.id.as_str()),
            "Turn completed"
        );

        emit(
            tx,
            TurnEvent::Completed(CompletedTurn {
                text: outcome.text.clone(),
                channel: outcome.channel(),
                message_id: assistant.id,
                draft_id: revision.as_ref().map(|r| r.draft.id.clone()),
                version: revision.as_ref().map(|r| r.version.version),
            }),
        )
        .await
    }

    /// New draft for the thread, or the next version of its active one
    async fn store_draft(
        &self,
        thread_id: &str,
        intent: Intent,
        request: &str,
        text: &str,
        message_id: &str,
    ) -> Result<DraftRevision, TurnError> {
        let mut version = NewVersion::new(text).parent_message(message_id);
        if intent == Intent::Edit {
            version = version.edit_prompt(request);
        }

        let revision = match self.drafts.active_for_thread(thread_id).await? {
            Some(active) => self.drafts.append_version(&active.id, version).await?,
            None => self.drafts.create(thread_id, None, version).await?,
        };
        Ok(revision)
    }

    /// Latest stored text of the thread's active draft
    async fn current_draft_text(&self, thread_id: &str) -> Result<Option<String>, TurnError> {
        let Some(active) = self.drafts.active_for_thread(thread_id).await? else {
            return Ok(None);
        };
        let version = self
            .drafts
            .get_version(&active.id, active.current_version)
            .await?;
        Ok(Some(version.content))
    }
}

async fn emit(tx: &mpsc::Sender<TurnEvent>, event: TurnEvent) -> Result<(), TurnError> {
    tx.send(event).await.map_err(|_| TurnError::Cancelled)
}
