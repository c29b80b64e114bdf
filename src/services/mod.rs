//! Services
//!
//! Business logic for the memory and RAG subsystem: the per-project store,
//! the summarization scheduler, the external pipeline runner, and the thin
//! model client they share.

pub mod llm;
pub mod memory;
pub mod process;
pub mod rag;

pub use memory::{MemoryArena, ProjectIdentity, ProjectMemoryStore, SummaryScheduler, Summarizer};
pub use process::{ProcResult, ProcessRunner, RunRequest, TokioProcessRunner};
pub use rag::RagRunner;
