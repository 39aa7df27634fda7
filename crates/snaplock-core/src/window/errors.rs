use crate::errors::SnaplockError;
use crate::window::types::WindowHandle;

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Failed to enumerate windows: {message}")]
    EnumerationFailed { message: String },

    #[error("Window {handle} no longer exists")]
    WindowGone { handle: WindowHandle },

    #[error("Failed to move window {handle}: {message}")]
    MoveFailed {
        handle: WindowHandle,
        message: String,
    },

    #[error("Failed to access desktop snapshot '{path}': {source}")]
    SnapshotIo {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid desktop snapshot '{path}': {message}")]
    SnapshotParse {
        path: std::path::PathBuf,
        message: String,
    },
}

impl SnaplockError for WindowError {
    fn error_code(&self) -> &'static str {
        match self {
            WindowError::EnumerationFailed { .. } => "WINDOW_ENUMERATION_FAILED",
            WindowError::WindowGone { .. } => "WINDOW_GONE",
            WindowError::MoveFailed { .. } => "WINDOW_MOVE_FAILED",
            WindowError::SnapshotIo { .. } => "WINDOW_SNAPSHOT_IO",
            WindowError::SnapshotParse { .. } => "WINDOW_SNAPSHOT_PARSE",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, WindowError::SnapshotParse { .. })
    }
}
