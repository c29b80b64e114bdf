//! Cross-Platform Path Utilities
//!
//! Functions for resolving the per-user DraftMate directories
//! (~/.draftmate/ and its memory/venv/rag subfolders).

use std::path::PathBuf;

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the DraftMate directory (~/.draftmate/)
pub fn draftmate_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".draftmate"))
}

/// Get the memory area for unsaved projects (~/.draftmate/memory/)
pub fn unsaved_memory_dir() -> AppResult<PathBuf> {
    Ok(draftmate_dir()?.join("memory"))
}

/// Turn an arbitrary project title into a usable folder name.
///
/// Characters that are invalid in file names on any supported platform are
/// replaced with underscores; an empty result becomes "untitled".
pub fn sanitize_file_name(name: &str) -> String {
    const INVALID: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if INVALID.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}
