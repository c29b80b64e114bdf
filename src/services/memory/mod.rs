//! Project Memory
//!
//! Durable conversational state and its compression policy.

pub mod store;
pub mod summarizer;

pub use store::{ClearOutcome, MemoryArena, ProjectIdentity, ProjectMemoryStore};
pub use summarizer::{OllamaSummarizer, SummaryScheduler, Summarizer};
