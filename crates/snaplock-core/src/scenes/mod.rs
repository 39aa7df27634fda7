//! Named window arrangements.
//!
//! [`SceneStore`] persists scenes as a JSON array with an optional screen
//! thumbnail per scene. [`SceneRestorer`] reconciles a stored scene against
//! the live desktop, relaunching missing apps and polling for their windows
//! on background workers owned by a [`PendingRestores`] handle.

pub mod errors;
pub mod persistence;
pub mod restore;
pub mod thumbnail;
pub mod types;

pub use errors::SceneError;
pub use persistence::{SceneStore, default_scene_name};
pub use restore::{
    ItemOutcome, PendingRestores, RestoreReport, RetryOutcome, RetryPolicy, RetryTask,
    SceneRestorer,
};
pub use thumbnail::{NoopThumbnailer, ThumbnailCapturer};
#[cfg(feature = "thumbnails")]
pub use thumbnail::ScreenThumbnailer;
pub use types::Scene;
