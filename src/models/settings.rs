//! Memory Settings Models
//!
//! Per-project configuration stored in settings.json. Every field carries a
//! serde default so a partial or hand-edited document still loads; an
//! unparseable document falls back to `MemorySettings::default()` at the
//! store layer.

use serde::{Deserialize, Serialize};

/// Compression is never triggered more often than every this many turns,
/// regardless of how low `summarize_every_n_turns` is configured.
pub const MIN_SUMMARIZE_INTERVAL: u32 = 4;

/// Default chat/QA model served by Ollama
pub const DEFAULT_CHAT_MODEL: &str = "gemma3:12b-it-q4_K_M";

/// Default vision model used for OCR by the pipeline
pub const DEFAULT_OCR_MODEL: &str = "qwen3-vl:8b-instruct-q4_K_M";

/// Default embedding model used by the pipeline
pub const DEFAULT_EMBED_MODEL: &str = "qwen3-embedding:8b-q4_K_M";

/// Per-project memory and RAG configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MemorySettings {
    /// Whether conversation memory is recorded and injected at all
    pub enable_memory: bool,
    /// Attach the current viewport screenshot to chat prompts
    pub include_screenshot_in_prompt: bool,
    /// Keep a copy of each attached screenshot under screenshots/
    pub save_screenshots_to_disk: bool,
    /// How many recent turns are replayed into each prompt
    pub max_recent_turns: u32,
    /// Compression trigger: turns appended between summary refreshes
    pub summarize_every_n_turns: u32,
    /// Chat/summarization model served by Ollama
    pub model_name: String,
    /// Answer questions exclusively through the RAG pipeline
    pub enable_rag_only: bool,
    /// Folder (under the project root) holding documents to index
    pub rag_folder_name: String,
    /// Folder (under the project root) holding the built index
    pub rag_store_folder_name: String,
    /// Explicit python executable; empty = resolve automatically
    pub python_exe_path: String,
    /// Explicit pipeline script path; empty = resolve automatically
    pub rag_script_path: String,
    /// Poppler bin folder for PDF rasterization; empty = unset
    pub poppler_bin_path: String,
    /// Retrieval depth passed to the pipeline, clamped to >= 1 at use time
    pub rag_top_k: u32,
    /// Vision model used by the pipeline for OCR
    pub ocr_model_name: String,
    /// Text model used by the pipeline for answer generation
    pub qa_model_name: String,
    /// Embedding model used by the pipeline
    pub embed_model_name: String,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            enable_memory: true,
            include_screenshot_in_prompt: false,
            save_screenshots_to_disk: true,
            max_recent_turns: 6,
            summarize_every_n_turns: 12,
            model_name: DEFAULT_CHAT_MODEL.to_string(),
            enable_rag_only: false,
            rag_folder_name: "OllamaRAG".to_string(),
            rag_store_folder_name: "rag_store".to_string(),
            python_exe_path: String::new(),
            rag_script_path: String::new(),
            poppler_bin_path: String::new(),
            rag_top_k: 10,
            ocr_model_name: DEFAULT_OCR_MODEL.to_string(),
            qa_model_name: DEFAULT_CHAT_MODEL.to_string(),
            embed_model_name: DEFAULT_EMBED_MODEL.to_string(),
        }
    }
}

impl MemorySettings {
    /// Retrieval depth with the >= 1 invariant applied (clamped, not rejected)
    pub fn effective_top_k(&self) -> u32 {
        self.rag_top_k.max(1)
    }

    /// Turns between summary compressions, floored at MIN_SUMMARIZE_INTERVAL
    pub fn summarize_threshold(&self) -> u32 {
        self.summarize_every_n_turns.max(MIN_SUMMARIZE_INTERVAL)
    }

    /// Apply a partial update to the settings
    pub fn apply_update(&mut self, update: MemorySettingsUpdate) {
        if let Some(v) = update.enable_memory {
            self.enable_memory = v;
        }
        if let Some(v) = update.include_screenshot_in_prompt {
            self.include_screenshot_in_prompt = v;
        }
        if let Some(v) = update.save_screenshots_to_disk {
            self.save_screenshots_to_disk = v;
        }
        if let Some(v) = update.max_recent_turns {
            self.max_recent_turns = v;
        }
        if let Some(v) = update.summarize_every_n_turns {
            self.summarize_every_n_turns = v;
        }
        if let Some(v) = update.model_name {
            self.model_name = v;
        }
        if let Some(v) = update.enable_rag_only {
            self.enable_rag_only = v;
        }
        if let Some(v) = update.rag_folder_name {
            self.rag_folder_name = v;
        }
        if let Some(v) = update.rag_store_folder_name {
            self.rag_store_folder_name = v;
        }
        if let Some(v) = update.python_exe_path {
            self.python_exe_path = v;
        }
        if let Some(v) = update.rag_script_path {
            self.rag_script_path = v;
        }
        if let Some(v) = update.poppler_bin_path {
            self.poppler_bin_path = v;
        }
        if let Some(v) = update.rag_top_k {
            self.rag_top_k = v;
        }
        if let Some(v) = update.ocr_model_name {
            self.ocr_model_name = v;
        }
        if let Some(v) = update.qa_model_name {
            self.qa_model_name = v;
        }
        if let Some(v) = update.embed_model_name {
            self.embed_model_name = v;
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MemorySettingsUpdate {
    pub enable_memory: Option<bool>,
    pub include_screenshot_in_prompt: Option<bool>,
    pub save_screenshots_to_disk: Option<bool>,
    pub max_recent_turns: Option<u32>,
    pub summarize_every_n_turns: Option<u32>,
    pub model_name: Option<String>,
    pub enable_rag_only: Option<bool>,
    pub rag_folder_name: Option<String>,
    pub rag_store_folder_name: Option<String>,
    pub python_exe_path: Option<String>,
    pub rag_script_path: Option<String>,
    pub poppler_bin_path: Option<String>,
    pub rag_top_k: Option<u32>,
    pub ocr_model_name: Option<String>,
    pub qa_model_name: Option<String>,
    pub embed_model_name: Option<String>,
}
