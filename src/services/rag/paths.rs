//! RAG Path Resolution
//!
//! Pure precedence rules for locating the Python interpreter, the pipeline
//! script, and the index artifacts. The only side effects are filesystem
//! existence checks. Explicit configuration always wins; a global install is
//! preferred over per-project fallbacks; a script shipped next to the binary
//! covers the first run before any global setup exists.

use std::path::{Path, PathBuf};

use crate::models::settings::MemorySettings;
use crate::utils::error::AppResult;
use crate::utils::paths::draftmate_dir;

/// File name of the pipeline script
pub const RAG_SCRIPT_NAME: &str = "rag_pipeline.py";

/// Vector index artifact written by the pipeline into the store folder
pub const INDEX_FILE_NAME: &str = "faiss.index";

/// Chunk metadata artifact written by the pipeline into the store folder
pub const META_FILE_NAME: &str = "meta.pkl";

/// Where the global installer places the pipeline script
pub fn global_rag_script_path() -> AppResult<PathBuf> {
    Ok(draftmate_dir()?.join("rag").join(RAG_SCRIPT_NAME))
}

/// Python executable inside a virtual environment root
fn venv_python(venv_root: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_root.join("Scripts").join("python.exe")
    } else {
        venv_root.join("bin").join("python")
    }
}

/// Resolve the Python interpreter used to run the pipeline.
///
/// Precedence: explicit configured path, global venv under ~/.draftmate,
/// project-local venv, bare "python" from the environment.
pub fn resolve_python_exe(project_root: &Path, settings: &MemorySettings) -> String {
    resolve_python_exe_in(draftmate_dir().ok().as_deref(), project_root, settings)
}

/// Resolution core with an injectable global directory (tests use a tempdir)
pub fn resolve_python_exe_in(
    global_dir: Option<&Path>,
    project_root: &Path,
    settings: &MemorySettings,
) -> String {
    if !settings.python_exe_path.is_empty() && Path::new(&settings.python_exe_path).exists() {
        return settings.python_exe_path.clone();
    }

    if let Some(dir) = global_dir {
        let global = venv_python(&dir.join("venv"));
        if global.exists() {
            return global.to_string_lossy().into_owned();
        }
    }

    let local = venv_python(&project_root.join("venv"));
    if local.exists() {
        return local.to_string_lossy().into_owned();
    }

    "python".to_string()
}

/// Resolve the pipeline script location, or None when no candidate exists.
///
/// Precedence: explicit absolute configured path, global install, a copy
/// placed next to the running executable.
pub fn resolve_rag_script(settings: &MemorySettings) -> Option<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));
    resolve_rag_script_in(
        draftmate_dir().ok().as_deref(),
        exe_dir.as_deref(),
        settings,
    )
}

/// Resolution core with injectable global and executable directories
pub fn resolve_rag_script_in(
    global_dir: Option<&Path>,
    exe_dir: Option<&Path>,
    settings: &MemorySettings,
) -> Option<PathBuf> {
    if !settings.rag_script_path.is_empty() {
        let configured = Path::new(&settings.rag_script_path);
        if configured.is_absolute() && configured.exists() {
            return Some(configured.to_path_buf());
        }
    }

    if let Some(dir) = global_dir {
        let global = dir.join("rag").join(RAG_SCRIPT_NAME);
        if global.exists() {
            return Some(global);
        }
    }

    if let Some(dir) = exe_dir {
        let sibling = dir.join(RAG_SCRIPT_NAME);
        if sibling.exists() {
            return Some(sibling);
        }
    }

    None
}

/// Whether the index is usable: both artifacts exist in the store folder.
/// A half-written index that happens to have both files is indistinguishable
/// from ready.
pub fn index_ready(project_root: &Path, settings: &MemorySettings) -> bool {
    let store = project_root.join(&settings.rag_store_folder_name);
    store.join(INDEX_FILE_NAME).exists() && store.join(META_FILE_NAME).exists()
}
