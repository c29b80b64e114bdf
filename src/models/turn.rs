//! Conversation Turn Model
//!
//! One chat exchange half, written once to conversation.jsonl and never
//! edited afterwards. Line order in the log is the conversation order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
    /// "user" or "assistant" in practice; stored as an open string
    pub role: String,
    /// Message text
    pub content: String,
    /// Model that produced (or received) the turn
    pub model: String,
    /// Whether a viewport screenshot accompanied the prompt
    pub screenshot_included: bool,
    /// Saved screenshot location, when one was written to disk
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_path: Option<String>,
    /// Document that was active in the host when the turn happened
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_document_path: Option<String>,
}

impl ChatTurn {
    /// Create a turn stamped with the current time
    pub fn new(role: impl Into<String>, content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            role: role.into(),
            content: content.into(),
            model: model.into(),
            screenshot_included: false,
            screenshot_path: None,
            active_document_path: None,
        }
    }

    /// Mark the turn as carrying a screenshot, optionally saved at `path`
    pub fn with_screenshot(mut self, path: Option<String>) -> Self {
        self.screenshot_included = true;
        self.screenshot_path = path;
        self
    }

    /// Record the host document the turn belongs to
    pub fn with_active_document(mut self, path: impl Into<String>) -> Self {
        self.active_document_path = Some(path.into());
        self
    }
}
