//! Project Memory Store
//!
//! Durable per-project conversational state: settings, rolling summary,
//! append-only conversation log, and saved screenshots. One store instance
//! owns one project root; a single async mutex serializes every operation
//! that touches the shared files, so concurrent callers are ordered rather
//! than interleaved.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::models::settings::MemorySettings;
use crate::models::turn::ChatTurn;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{sanitize_file_name, unsaved_memory_dir};

/// Settings document file name
pub const SETTINGS_FILE: &str = "settings.json";

/// Rolling summary file name
pub const SUMMARY_FILE: &str = "summary.txt";

/// Append-only conversation log file name
pub const CONVERSATION_FILE: &str = "conversation.jsonl";

/// Screenshot subfolder name
pub const SCREENSHOTS_DIR: &str = "screenshots";

/// Stable key binding a memory store to a unit of work in the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectIdentity {
    /// A project saved to disk; memory lives in a sibling folder
    Saved { document_path: PathBuf },
    /// A project that has never been saved; memory lives under the
    /// per-user application-data area, keyed by title
    Unsaved { title: String },
}

impl ProjectIdentity {
    /// Resolve the memory root folder for this identity.
    ///
    /// Saved projects get `<parent>/<stem>_memory` next to the document;
    /// unsaved projects get `~/.draftmate/memory/<sanitized title>`.
    pub fn memory_root(&self) -> AppResult<PathBuf> {
        match self {
            ProjectIdentity::Saved { document_path } => {
                let parent = document_path.parent().ok_or_else(|| {
                    AppError::config(format!(
                        "Document path has no parent folder: {}",
                        document_path.display()
                    ))
                })?;
                let stem = document_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "untitled".to_string());
                Ok(parent.join(format!("{}_memory", stem)))
            }
            ProjectIdentity::Unsaved { title } => {
                Ok(unsaved_memory_dir()?.join(sanitize_file_name(title)))
            }
        }
    }
}

/// A single failed best-effort deletion during `clear`
#[derive(Debug, Clone)]
pub struct DeleteFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a `clear` call. Cleanup never aborts the caller; whatever could
/// not be deleted is reported here for logging.
#[derive(Debug, Clone, Default)]
pub struct ClearOutcome {
    pub failed_deletes: Vec<DeleteFailure>,
}

/// Durable store for one project's conversational memory
pub struct ProjectMemoryStore {
    root: PathBuf,
    gate: Mutex<()>,
}

impl ProjectMemoryStore {
    /// Open (and lazily create) the store at `root`.
    ///
    /// Creates the folder tree and seeds default settings, an empty summary
    /// and an empty conversation log. Existing files are never overwritten.
    pub async fn open(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        tokio::fs::create_dir_all(root.join(SCREENSHOTS_DIR)).await?;

        let settings_path = root.join(SETTINGS_FILE);
        if !settings_path.exists() {
            let defaults = serde_json::to_string_pretty(&MemorySettings::default())?;
            tokio::fs::write(&settings_path, defaults).await?;
        }
        let summary_path = root.join(SUMMARY_FILE);
        if !summary_path.exists() {
            tokio::fs::write(&summary_path, "").await?;
        }
        let conversation_path = root.join(CONVERSATION_FILE);
        if !conversation_path.exists() {
            tokio::fs::write(&conversation_path, "").await?;
        }

        Ok(Self {
            root,
            gate: Mutex::new(()),
        })
    }

    /// The project memory root this store owns
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load settings, degrading to defaults when the document is missing or
    /// unreadable so the caller always has something usable.
    pub async fn load_settings(&self) -> MemorySettings {
        let _gate = self.gate.lock().await;
        let path = self.root.join(SETTINGS_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "settings unparseable, using defaults");
                    MemorySettings::default()
                }
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "settings unreadable, using defaults");
                MemorySettings::default()
            }
        }
    }

    /// Persist settings. Write failures propagate.
    pub async fn save_settings(&self, settings: &MemorySettings) -> AppResult<()> {
        let _gate = self.gate.lock().await;
        let content = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(self.root.join(SETTINGS_FILE), content).await?;
        Ok(())
    }

    /// Load the rolling summary, degrading to empty text on failure
    pub async fn load_summary(&self) -> String {
        let _gate = self.gate.lock().await;
        match tokio::fs::read_to_string(self.root.join(SUMMARY_FILE)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "summary unreadable, treating as empty");
                String::new()
            }
        }
    }

    /// Replace the rolling summary in full. Write failures propagate.
    pub async fn save_summary(&self, summary: &str) -> AppResult<()> {
        let _gate = self.gate.lock().await;
        tokio::fs::write(self.root.join(SUMMARY_FILE), summary).await?;
        Ok(())
    }

    /// Append one turn as a single JSON line. The log is append-only and is
    /// only ever rewritten by `clear`.
    pub async fn append_turn(&self, turn: &ChatTurn) -> AppResult<()> {
        let _gate = self.gate.lock().await;
        let mut line = serde_json::to_string(turn)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(CONVERSATION_FILE))
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    /// Return the last `max_turns` parseable turns in original append order.
    ///
    /// Corrupt lines are skipped so one bad record cannot take the rest of
    /// the history with it; an unreadable log degrades to an empty result.
    pub async fn load_recent_turns(&self, max_turns: usize) -> Vec<ChatTurn> {
        let _gate = self.gate.lock().await;
        let path = self.root.join(CONVERSATION_FILE);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "conversation log unreadable");
                return Vec::new();
            }
        };

        let mut dropped = 0usize;
        let mut turns: Vec<ChatTurn> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(turn) => Some(turn),
                Err(_) => {
                    dropped += 1;
                    None
                }
            })
            .collect();
        if dropped > 0 {
            tracing::debug!(dropped, "skipped unparseable conversation lines");
        }

        let skip = turns.len().saturating_sub(max_turns);
        turns.drain(..skip);
        turns
    }

    /// Empty the conversation log and summary, and delete saved screenshots.
    ///
    /// The truncations propagate failures; screenshot deletion is
    /// best-effort, with individual failures collected into the outcome for
    /// the caller to log. Settings are left untouched.
    pub async fn clear(&self) -> AppResult<ClearOutcome> {
        let _gate = self.gate.lock().await;
        tokio::fs::write(self.root.join(CONVERSATION_FILE), "").await?;
        tokio::fs::write(self.root.join(SUMMARY_FILE), "").await?;

        let mut outcome = ClearOutcome::default();
        let screenshots = self.root.join(SCREENSHOTS_DIR);
        match tokio::fs::read_dir(&screenshots).await {
            Ok(mut entries) => {
                while let Ok(Some(entry)) = entries.next_entry().await {
                    let path = entry.path();
                    if let Err(e) = tokio::fs::remove_file(&path).await {
                        tracing::warn!(path = %path.display(), error = %e, "failed to delete screenshot");
                        outcome.failed_deletes.push(DeleteFailure {
                            path,
                            reason: e.to_string(),
                        });
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %screenshots.display(), error = %e, "failed to list screenshots");
            }
        }
        Ok(outcome)
    }

    /// Save a screenshot as `{timestamp}_{prefix}.png` and return its path.
    ///
    /// Timestamps have second resolution; two saves with the same prefix in
    /// the same second overwrite each other.
    pub async fn save_screenshot(&self, bytes: &[u8], prefix: &str) -> AppResult<PathBuf> {
        let name = format!(
            "{}_{}.png",
            chrono::Local::now().format("%Y%m%d_%H%M%S"),
            sanitize_file_name(prefix)
        );
        let dir = self.root.join(SCREENSHOTS_DIR);
        tokio::fs::create_dir_all(&dir).await?;
        let path = dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }
}

impl std::fmt::Debug for ProjectMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectMemoryStore")
            .field("root", &self.root)
            .finish()
    }
}

/// Arena of stores keyed by resolved memory root. Binding the same identity
/// twice returns the same store; binding a new identity opens (and seeds) a
/// new one. Nothing is ever unbound implicitly.
#[derive(Debug, Default)]
pub struct MemoryArena {
    stores: Mutex<HashMap<PathBuf, Arc<ProjectMemoryStore>>>,
}

impl MemoryArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a project identity, opening its store on first use.
    ///
    /// Rebinding an already-open root is a no-op that returns the existing
    /// store; on-disk files are never overwritten by a rebind.
    pub async fn bind(&self, identity: &ProjectIdentity) -> AppResult<Arc<ProjectMemoryStore>> {
        let root = identity.memory_root()?;
        let mut stores = self.stores.lock().await;
        if let Some(store) = stores.get(&root) {
            return Ok(store.clone());
        }

        tracing::info!(root = %root.display(), "opening project memory");
        let store = Arc::new(ProjectMemoryStore::open(&root).await?);
        stores.insert(root, store.clone());
        Ok(store)
    }
}
