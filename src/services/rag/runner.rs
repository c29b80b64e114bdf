//! RAG Pipeline Runner
//!
//! Drives the external indexing/query pipeline as a subprocess: builds the
//! document index for a project and answers questions against it. Readiness
//! and path questions are delegated to `rag::paths`; actual spawning goes
//! through the `ProcessRunner` seam so tests can observe invocations without
//! a real interpreter.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::models::settings::MemorySettings;
use crate::services::process::{ProcResult, ProcessRunner, RunRequest, TokioProcessRunner};
use crate::services::rag::paths::{global_rag_script_path, resolve_python_exe, resolve_rag_script, RAG_SCRIPT_NAME};
use crate::utils::error::AppResult;

/// Sentinel exit code reported when the pipeline script cannot be located.
/// No process is spawned in that case.
pub const SCRIPT_MISSING_EXIT_CODE: i32 = 2;

/// Environment variable consulted for the Poppler bin folder when
/// `poppler_bin_path` is unset
pub const POPPLER_ENV_VAR: &str = "POPPLER_PATH";

/// What the pipeline is asked to do
enum PipelineMode<'a> {
    /// Ingest the document folder and (re)build the index
    Build,
    /// Answer a question against the existing index
    Ask(&'a str),
}

/// Orchestrates build-index and ask calls against the external pipeline
pub struct RagRunner {
    runner: Arc<dyn ProcessRunner>,
    timeout: Option<Duration>,
}

impl RagRunner {
    /// Create a runner that spawns real processes with no deadline
    pub fn new() -> Self {
        Self::with_runner(Arc::new(TokioProcessRunner::new()))
    }

    /// Create a runner over a custom process executor
    pub fn with_runner(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            timeout: None,
        }
    }

    /// Kill pipeline runs that exceed `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ingest the project's document folder and rebuild the index.
    ///
    /// Creates the document and store folders when absent. Returns the
    /// pipeline's captured output; a missing script short-circuits with the
    /// sentinel exit code instead of spawning.
    pub async fn build_index(
        &self,
        project_root: &Path,
        settings: &MemorySettings,
    ) -> AppResult<ProcResult> {
        self.run_pipeline(project_root, settings, PipelineMode::Build)
            .await
    }

    /// Answer a question against the project's index.
    ///
    /// Empty or whitespace stdout is a valid (if uninformative) answer and is
    /// passed through for the caller to judge.
    pub async fn ask(
        &self,
        project_root: &Path,
        settings: &MemorySettings,
        question: &str,
    ) -> AppResult<ProcResult> {
        self.run_pipeline(project_root, settings, PipelineMode::Ask(question))
            .await
    }

    async fn run_pipeline(
        &self,
        project_root: &Path,
        settings: &MemorySettings,
        mode: PipelineMode<'_>,
    ) -> AppResult<ProcResult> {
        let Some(script) = resolve_rag_script(settings) else {
            return Ok(script_missing_result());
        };

        let rag_dir = project_root.join(&settings.rag_folder_name);
        let store_dir = project_root.join(&settings.rag_store_folder_name);
        tokio::fs::create_dir_all(&rag_dir).await?;
        tokio::fs::create_dir_all(&store_dir).await?;

        let args = build_pipeline_args(&script, &rag_dir, &store_dir, settings, &mode);
        let program = resolve_python_exe(project_root, settings);

        tracing::debug!(program = %program, args = %args, "launching RAG pipeline");

        let mut request = RunRequest::new(program, args, project_root);
        if let Some(timeout) = self.timeout {
            request = request.with_timeout(timeout);
        }
        self.runner.run(&request).await
    }
}

impl Default for RagRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Quote one argument value for the pipeline command line: embedded double
/// quotes are backslash-escaped, then the whole value is wrapped in double
/// quotes so it stays a single shell token.
pub fn quote_arg(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

/// Assemble the deterministic pipeline argument string
fn build_pipeline_args(
    script: &Path,
    rag_dir: &Path,
    store_dir: &Path,
    settings: &MemorySettings,
    mode: &PipelineMode<'_>,
) -> String {
    let mut parts = vec![quote_arg(&script.to_string_lossy())];

    match mode {
        PipelineMode::Build => {
            parts.push("--dir".to_string());
            parts.push(quote_arg(&rag_dir.to_string_lossy()));
        }
        PipelineMode::Ask(question) => {
            parts.push("--ask".to_string());
            parts.push(quote_arg(question));
        }
    }

    parts.push("--store".to_string());
    parts.push(quote_arg(&store_dir.to_string_lossy()));
    parts.push("--topk".to_string());
    parts.push(settings.effective_top_k().to_string());

    for (flag, model) in [
        ("--ocr", &settings.ocr_model_name),
        ("--qa", &settings.qa_model_name),
        ("--embed", &settings.embed_model_name),
    ] {
        if !model.is_empty() {
            parts.push(flag.to_string());
            parts.push(quote_arg(model));
        }
    }

    if let Some(poppler) = poppler_path(settings) {
        parts.push("--poppler".to_string());
        parts.push(quote_arg(&poppler));
    }

    parts.join(" ")
}

/// Poppler location: explicit setting first, then the environment override
fn poppler_path(settings: &MemorySettings) -> Option<String> {
    if !settings.poppler_bin_path.is_empty() {
        return Some(settings.poppler_bin_path.clone());
    }
    std::env::var(POPPLER_ENV_VAR)
        .ok()
        .filter(|v| !v.is_empty())
}

fn script_missing_result() -> ProcResult {
    let expected: PathBuf = global_rag_script_path()
        .unwrap_or_else(|_| PathBuf::from(RAG_SCRIPT_NAME));
    ProcResult {
        exit_code: SCRIPT_MISSING_EXIT_CODE,
        stdout: String::new(),
        stderr: format!(
            "RAG pipeline script not found. Expected at {}; set ragScriptPath or re-run the assistant setup.",
            expected.display()
        ),
    }
}
