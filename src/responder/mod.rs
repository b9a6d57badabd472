//! Conversational text for free talk and completed events.
//!
//! [`RemoteResponder`] asks the configured generators first and falls back
//! to the deterministic templates in [`fallback`] on any failure, so callers
//! always get text back. [`OfflineResponder`] skips the network entirely.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::events::EventRecord;
use crate::providers::{GenerationRequest, ProviderError, TextGenerator};

pub mod fallback;
pub mod prompts;

/// Produces bot text. Never fails: implementations degrade to templates.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Reply to a message that matched no intent.
    async fn free_text_reply(&self, message: &str) -> String;

    /// Confirmation shown after the sixth answer.
    async fn completion_summary(&self, record: &EventRecord) -> String;
}

/// Remote generation with template fallback.
pub struct RemoteResponder {
    chat: Arc<dyn TextGenerator>,
    summary: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl RemoteResponder {
    /// Build from a free-talk generator, a summary generator and a per-call bound.
    ///
    /// `timeout` applies to each HTTP call, so a generator that may fall back
    /// to a second endpoint gets twice the budget.
    pub fn new(
        chat: Arc<dyn TextGenerator>,
        summary: Arc<dyn TextGenerator>,
        timeout: Duration,
    ) -> Self {
        Self {
            chat,
            summary,
            timeout,
        }
    }

    async fn bounded(
        &self,
        generator: &dyn TextGenerator,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError> {
        let budget = self.timeout.saturating_mul(generator.attempts().max(1));
        match tokio::time::timeout(budget, generator.generate(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(budget.as_secs())),
        }
    }
}

#[async_trait]
impl ResponseGenerator for RemoteResponder {
    async fn free_text_reply(&self, message: &str) -> String {
        let request = GenerationRequest::prompt(message);
        match self.bounded(self.chat.as_ref(), &request).await {
            Ok(text) => {
                debug!(endpoint = %self.chat.endpoint(), "free-text reply generated remotely");
                text
            }
            Err(e) => {
                warn!(endpoint = %self.chat.endpoint(), error = %e, "free-text generation failed, using fallback");
                fallback::fallback_reply(message)
            }
        }
    }

    async fn completion_summary(&self, record: &EventRecord) -> String {
        let request = GenerationRequest::prompt(prompts::completion_prompt(record));
        match self.bounded(self.summary.as_ref(), &request).await {
            Ok(text) => {
                debug!(endpoint = %self.summary.endpoint(), event_id = %record.id, "summary generated remotely");
                text
            }
            Err(e) => {
                warn!(endpoint = %self.summary.endpoint(), error = %e, "summary generation failed, using fallback");
                fallback::fallback_summary(record)
            }
        }
    }
}

/// Template-only generator for offline use.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineResponder;

#[async_trait]
impl ResponseGenerator for OfflineResponder {
    async fn free_text_reply(&self, message: &str) -> String {
        fallback::fallback_reply(message)
    }

    async fn completion_summary(&self, record: &EventRecord) -> String {
        fallback::fallback_summary(record)
    }
}
