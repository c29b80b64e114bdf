//! Conversation Summarization
//!
//! Trigger policy and persistence for the rolling summary. Counts appended
//! turns and, once the configured threshold is crossed, folds the recent
//! window into the stored summary via a single-shot model call. Compression
//! is best-effort: a failed call leaves the previous summary in place and
//! never surfaces into the chat flow.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::models::settings::MemorySettings;
use crate::models::turn::ChatTurn;
use crate::services::llm::{ChatMessage, OllamaClient};
use crate::services::memory::store::ProjectMemoryStore;
use crate::utils::error::{AppError, AppResult};

/// How many trailing turns are handed to the summarizer — wider than the
/// per-prompt recency window so compressed history overlaps what the prompt
/// already replays.
pub const SUMMARY_WINDOW_TURNS: usize = 20;

/// Single-shot summarization capability
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Fold `turns` into `existing_summary`, returning the replacement text
    async fn summarize(&self, existing_summary: &str, turns: &[ChatTurn]) -> AppResult<String>;
}

/// Decides when to compress history and persists the result
pub struct SummaryScheduler {
    store: Arc<ProjectMemoryStore>,
    summarizer: Arc<dyn Summarizer>,
    turns_since_compression: AtomicU32,
}

impl SummaryScheduler {
    /// Create a scheduler over a store and a summarization capability
    pub fn new(store: Arc<ProjectMemoryStore>, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            store,
            summarizer,
            turns_since_compression: AtomicU32::new(0),
        }
    }

    /// Turns appended since the last successful or attempted compression
    pub fn pending_turns(&self) -> u32 {
        self.turns_since_compression.load(Ordering::SeqCst)
    }

    /// Record one appended user+assistant exchange and compress when due.
    ///
    /// The counter resets as soon as the threshold is reached, before the
    /// model call, so a slow or failing call cannot retrigger itself.
    pub async fn on_pair_appended(&self, settings: &MemorySettings) {
        let count = self.turns_since_compression.fetch_add(2, Ordering::SeqCst) + 2;
        if count < settings.summarize_threshold() {
            return;
        }
        self.turns_since_compression.store(0, Ordering::SeqCst);

        if let Err(e) = self.compress().await {
            tracing::warn!(error = %e, "summary compression failed, keeping previous summary");
        }
    }

    async fn compress(&self) -> AppResult<()> {
        let existing = self.store.load_summary().await;
        let turns = self.store.load_recent_turns(SUMMARY_WINDOW_TURNS).await;
        if turns.is_empty() {
            return Ok(());
        }

        let updated = self.summarizer.summarize(&existing, &turns).await?;
        self.store.save_summary(&updated).await?;
        tracing::debug!(chars = updated.len(), "rolling summary replaced");
        Ok(())
    }
}

const SUMMARY_SYSTEM_PROMPT: &str = "You maintain the rolling summary of a conversation between an engineer \
and a workbench assistant. Merge the previous summary with the new exchanges \
into one compact plain-text summary. Keep decisions, dimensions, part and \
file names, and open questions. Drop pleasantries. Output only the summary.";

/// Production summarizer backed by the local Ollama server
pub struct OllamaSummarizer {
    client: OllamaClient,
    model: String,
}

impl OllamaSummarizer {
    /// Create a summarizer that calls `model` through `client`
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Summarizer for OllamaSummarizer {
    async fn summarize(&self, existing_summary: &str, turns: &[ChatTurn]) -> AppResult<String> {
        let messages = vec![
            ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
            ChatMessage::user(build_summary_request(existing_summary, turns)),
        ];

        let reply = self.client.chat(&self.model, &messages).await?;
        let trimmed = reply.trim();
        if trimmed.is_empty() {
            return Err(AppError::llm("summarization returned empty output"));
        }
        Ok(trimmed.to_string())
    }
}

/// Render the previous summary and the turn window into one request body
fn build_summary_request(existing_summary: &str, turns: &[ChatTurn]) -> String {
    let mut body = String::from("PREVIOUS SUMMARY:\n");
    if existing_summary.trim().is_empty() {
        body.push_str("(none)\n");
    } else {
        body.push_str(existing_summary.trim());
        body.push('\n');
    }

    body.push_str("\nRECENT EXCHANGES:\n");
    for turn in turns {
        body.push_str(&turn.role);
        body.push_str(": ");
        body.push_str(&turn.content);
        body.push('\n');
    }

    body.push_str("\nWrite the updated summary.");
    body
}
