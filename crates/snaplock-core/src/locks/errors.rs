use std::path::PathBuf;

use crate::errors::SnaplockError;

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Failed to access lock file '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No lock at index {index} (have {count})")]
    EntryNotFound { index: usize, count: usize },
}

impl SnaplockError for LockError {
    fn error_code(&self) -> &'static str {
        match self {
            LockError::IoError { .. } => "LOCK_IO_ERROR",
            LockError::EntryNotFound { .. } => "LOCK_NOT_FOUND",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, LockError::EntryNotFound { .. })
    }
}
