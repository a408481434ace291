use async_trait::async_trait;
use quill_persist::ThreadStore;
use quill_types::Intent;
use tracing::debug;

use crate::assembler::{ContextAssembler, ContextData};
use crate::error::Result;
use crate::history::HistoryWindow;
use crate::strategy::{ContextStrategy, ContextWindow};

pub struct DefaultContextStrategy {
    assembler: ContextAssembler,
    history: HistoryWindow,
}

impl DefaultContextStrategy {
    pub fn new(max_tokens: usize) -> Result<Self> {
        Ok(Self {
            assembler: ContextAssembler::new(),
            history: HistoryWindow::new(max_tokens)?,
        })
    }

    pub fn with_assembler(mut self, assembler: ContextAssembler) -> Self {
        self.assembler = assembler;
        self
    }
}

#[async_trait]
impl ContextStrategy for DefaultContextStrategy {
    async fn get_context_window(
        &self,
        thread_id: &str,
        intent: Intent,
        data: &ContextData,
        threads: &dyn ThreadStore,
    ) -> Result<ContextWindow> {
        let stored = threads.list_messages(thread_id, None, None).await?;
        let messages = self.history.build(&stored);
        debug!(
            thread_id = %thread_id,
            total = stored.len(),
            kept = messages.len(),
            "History window built"
        );

        Ok(ContextWindow {
            system_prompt: self.assembler.assemble(intent, data),
            messages,
        })
    }
}
