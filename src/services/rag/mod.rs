//! RAG Orchestration
//!
//! Path resolution for the external pipeline and the runner that drives it.

pub mod paths;
pub mod runner;

pub use paths::{index_ready, resolve_python_exe, resolve_rag_script};
pub use runner::{RagRunner, POPPLER_ENV_VAR, SCRIPT_MISSING_EXIT_CODE};
