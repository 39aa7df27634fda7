use crate::errors::SnaplockError;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("No executable path recorded")]
    MissingPath,

    #[error("Failed to launch '{exec_path}': {source}")]
    SpawnFailed {
        exec_path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SnaplockError for LaunchError {
    fn error_code(&self) -> &'static str {
        match self {
            LaunchError::MissingPath => "LAUNCH_MISSING_PATH",
            LaunchError::SpawnFailed { .. } => "LAUNCH_SPAWN_FAILED",
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, LaunchError::MissingPath)
    }
}
