use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Parse error in {path:?} at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Unknown difficulty {value:?} in {path:?}")]
    UnknownDifficulty { path: PathBuf, value: String },

    #[error("Chart {0:?} has no difficulty field")]
    MissingDifficulty(PathBuf),

    #[error("Unresolved title conflict in {dirname:?}: {candidates:?}")]
    ConflictUnresolved {
        dirname: PathBuf,
        candidates: BTreeSet<String>,
    },

    #[error("Failed to copy {from:?} to {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("Metadata lookup failed: {0}")]
    Metadata(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error is a title conflict the caller declined to resolve
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConflictUnresolved { .. })
    }
}
