use crate::errors::SnaplockError;
use crate::locks::LockError;
use crate::scenes::SceneError;
use crate::window::{WindowError, WindowHandle};

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("Window {handle} is not a layout candidate")]
    NotACandidate { handle: WindowHandle },
}

impl SnaplockError for HostError {
    fn error_code(&self) -> &'static str {
        match self {
            HostError::Window(e) => e.error_code(),
            HostError::Lock(e) => e.error_code(),
            HostError::Scene(e) => e.error_code(),
            HostError::NotACandidate { .. } => "HOST_NOT_A_CANDIDATE",
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            HostError::Window(e) => e.is_user_error(),
            HostError::Lock(e) => e.is_user_error(),
            HostError::Scene(e) => e.is_user_error(),
            HostError::NotACandidate { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_codes_pass_through() {
        let err: HostError = SceneError::NotFound {
            name: "x".to_string(),
        }
        .into();
        assert_eq!(err.error_code(), "SCENE_NOT_FOUND");
        assert!(err.is_user_error());
        assert_eq!(err.to_string(), "Scene 'x' not found");
    }
}
