use serde::{Deserialize, Serialize};
use std::fmt;

use super::frame::FrameInsets;
use crate::geometry::Rect;

/// Opaque identifier for a top-level window.
///
/// The core only references handles; it never owns the window. Ordering is
/// meaningful only for de-duplication, where the higher handle wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(u64);

impl WindowHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for WindowHandle {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything an adapter knows about one top-level window.
///
/// This is the raw input to [`super::filter_candidates`] and the record
/// format of a desktop snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowState {
    pub handle: WindowHandle,
    pub process_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub class_name: String,
    /// Visible rect, excluding compositor shadow padding.
    pub rect: Rect,
    #[serde(default)]
    pub frame: FrameInsets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_path: Option<String>,
    /// Browser address text or folder-browser path, when readable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_text: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default)]
    pub tool_window: bool,
    #[serde(default)]
    pub cloaked: bool,
    #[serde(default)]
    pub has_owner: bool,
}

fn default_true() -> bool {
    true
}

impl WindowState {
    /// A plain visible application window.
    pub fn new(
        handle: impl Into<WindowHandle>,
        process_name: impl Into<String>,
        title: impl Into<String>,
        rect: Rect,
    ) -> Self {
        Self {
            handle: handle.into(),
            process_name: process_name.into(),
            title: title.into(),
            class_name: String::new(),
            rect,
            frame: FrameInsets::default(),
            exec_path: None,
            identity_text: None,
            visible: true,
            minimized: false,
            tool_window: false,
            cloaked: false,
            has_owner: false,
        }
    }

    pub fn with_exec_path(mut self, path: impl Into<String>) -> Self {
        self.exec_path = Some(path.into());
        self
    }

    pub fn with_identity_text(mut self, text: impl Into<String>) -> Self {
        self.identity_text = Some(text.into());
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn with_frame(mut self, frame: FrameInsets) -> Self {
        self.frame = frame;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_ordering_and_display() {
        let low = WindowHandle::new(0x10);
        let high = WindowHandle::from(0x20);
        assert!(high > low);
        assert_eq!(low.to_string(), "16");
    }

    #[test]
    fn test_window_state_defaults_from_json() {
        let json = r#"{
            "handle": 7,
            "process_name": "code",
            "rect": {"x": 0, "y": 0, "width": 800, "height": 600}
        }"#;
        let state: WindowState = serde_json::from_str(json).unwrap();
        assert_eq!(state.handle, WindowHandle::new(7));
        assert!(state.visible);
        assert!(!state.minimized);
        assert_eq!(state.title, "");
        assert_eq!(state.identity_text, None);
    }
}
