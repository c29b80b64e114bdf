//! DraftMate Core - Memory & RAG Subsystem
//!
//! Durable per-project conversational memory and retrieval-augmented
//! generation orchestration for the DraftMate workbench assistant:
//! - Per-project stores binding a memory root to the active document
//! - Append-only conversation logging with concurrency-safe access
//! - Rolling summary compression driven by a turn-count policy
//! - An external indexing/query pipeline driven as a subprocess, with
//!   readiness tracking and structured failure reporting
//!
//! The host UI, screenshot capture, and document metadata extraction are
//! external collaborators; this crate only consumes the project identity
//! and bytes it is handed.

pub mod models;
pub mod services;
pub mod utils;

pub use models::settings::{MemorySettings, MemorySettingsUpdate};
pub use models::turn::ChatTurn;
pub use services::llm::{ChatMessage, OllamaClient};
pub use services::memory::store::{
    ClearOutcome, DeleteFailure, MemoryArena, ProjectIdentity, ProjectMemoryStore,
};
pub use services::memory::summarizer::{OllamaSummarizer, SummaryScheduler, Summarizer};
pub use services::process::{ProcResult, ProcessRunner, RunRequest, TokioProcessRunner};
pub use services::rag::paths::{index_ready, resolve_python_exe, resolve_rag_script};
pub use services::rag::runner::{RagRunner, POPPLER_ENV_VAR, SCRIPT_MISSING_EXIT_CODE};
pub use utils::error::{AppError, AppResult};
