use crate::geometry::Rect;
use crate::window::errors::WindowError;
use crate::window::types::WindowHandle;

/// Windowing capabilities the core consumes.
///
/// Implementations must be callable from retry worker threads, hence the
/// `Send + Sync` bound. Queries on a handle that has disappeared return the
/// neutral value (empty string, empty rect) rather than failing.
pub trait WindowSystem: Send + Sync {
    /// Visible, non-minimized, non-tool, non-cloaked windows of at least the
    /// minimum size, with system windows and the overlay removed and
    /// `(process_name, title)` duplicates collapsed to the higher handle.
    fn enumerate_candidate_windows(&self) -> Result<Vec<WindowHandle>, WindowError>;

    fn is_window(&self, handle: WindowHandle) -> bool;

    /// Owning process name without extension, or `"Unknown"`.
    fn process_name(&self, handle: WindowHandle) -> String;

    fn window_title(&self, handle: WindowHandle) -> String;

    /// Rect as perceived on screen, excluding shadow padding.
    fn visible_rect(&self, handle: WindowHandle) -> Rect;

    fn executable_path(&self, handle: WindowHandle) -> Option<String>;

    /// Move so that the visible rect equals `target` exactly.
    fn move_window_compensated(&self, handle: WindowHandle, target: Rect)
    -> Result<(), WindowError>;
}

/// Best-effort read of a browser's address text or a folder browser's path.
///
/// `None` means "unknown"; callers fall back to title-based identity.
pub trait IdentityTextSource: Send + Sync {
    fn auxiliary_identity_text(&self, handle: WindowHandle) -> Option<String>;
}
