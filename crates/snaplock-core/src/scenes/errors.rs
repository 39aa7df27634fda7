use std::path::PathBuf;

use crate::errors::SnaplockError;

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("Scene '{name}' not found")]
    NotFound { name: String },

    #[error("Scene name cannot be empty")]
    EmptyName,

    #[error("Failed to access scene storage '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize scenes: {message}")]
    SerializationFailed { message: String },

    #[error("Thumbnail capture failed: {message}")]
    ThumbnailFailed { message: String },
}

impl SnaplockError for SceneError {
    fn error_code(&self) -> &'static str {
        match self {
            SceneError::NotFound { .. } => "SCENE_NOT_FOUND",
            SceneError::EmptyName => "SCENE_EMPTY_NAME",
            SceneError::IoError { .. } => "SCENE_IO_ERROR",
            SceneError::SerializationFailed { .. } => "SCENE_SERIALIZATION_FAILED",
            SceneError::ThumbnailFailed { .. } => "SCENE_THUMBNAIL_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, SceneError::NotFound { .. } | SceneError::EmptyName)
    }
}
