use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReforgeError {
    #[error("project path not found: {path}")]
    PathNotFound { path: PathBuf },

    #[error("no progress ledger for {project}: run a scan first")]
    LedgerNotFound { project: PathBuf },

    #[error("ledger at {path} is corrupt: {reason}")]
    LedgerCorrupt { path: PathBuf, reason: String },

    #[error("config parse error in {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    #[error("editor root not found: {path}")]
    EditorRootNotFound { path: PathBuf },

    #[error("glob pattern error: {pattern}: {reason}")]
    GlobPattern { pattern: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReforgeError>;
