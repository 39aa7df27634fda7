//! Candidate window selection shared by every adapter.

use std::collections::HashMap;

use tracing::debug;

use crate::config::FilterConfig;
use crate::window::types::{WindowHandle, WindowState};

const SYSTEM_TITLES: &[&str] = &["Program Manager"];
const SYSTEM_CLASSES: &[&str] = &["Shell_TrayWnd", "WorkerW", "Progman"];
const IGNORED_PROCESS_PREFIXES: &[&str] = &["PixPin"];

/// Title of the overlay host window, which must never be laid out.
pub const OVERLAY_TITLE: &str = "snaplock_overlay_host";

/// Which windows take part in layout.
#[derive(Debug, Clone)]
pub struct FilterRules {
    pub min_extent: i32,
    pub ignored_titles: Vec<String>,
    pub ignored_classes: Vec<String>,
    pub overlay: Option<WindowHandle>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

impl FilterRules {
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            min_extent: config.min_window_extent(),
            ignored_titles: config.ignored_titles.clone(),
            ignored_classes: config.ignored_classes.clone(),
            overlay: None,
        }
    }

    pub fn with_overlay(mut self, overlay: WindowHandle) -> Self {
        self.overlay = Some(overlay);
        self
    }

    fn rejection(&self, w: &WindowState) -> Option<&'static str> {
        if !w.visible || w.minimized {
            return Some("hidden");
        }
        if w.tool_window || w.has_owner {
            return Some("tool_or_owned");
        }
        if w.cloaked {
            return Some("cloaked");
        }
        if w.rect.width < self.min_extent || w.rect.height < self.min_extent {
            return Some("too_small");
        }
        if self.overlay == Some(w.handle) || w.title == OVERLAY_TITLE {
            return Some("overlay");
        }
        if w.title.is_empty()
            || SYSTEM_TITLES.contains(&w.title.as_str())
            || self.ignored_titles.iter().any(|t| t == &w.title)
        {
            return Some("system_title");
        }
        // A title-only "Status" strip pinned at the origin is a shell helper.
        if w.title == "Status" && w.rect.x == 0 && w.rect.y == 0 {
            return Some("system_title");
        }
        if SYSTEM_CLASSES.contains(&w.class_name.as_str())
            || self.ignored_classes.iter().any(|c| c == &w.class_name)
        {
            return Some("system_class");
        }
        let process_lower = w.process_name.to_lowercase();
        if IGNORED_PROCESS_PREFIXES
            .iter()
            .any(|p| process_lower.starts_with(&p.to_lowercase()))
        {
            return Some("ignored_process");
        }
        None
    }
}

/// Apply the candidate rules to raw enumeration output.
///
/// Survivors are de-duplicated by `(process_name, title)`; on collision the
/// higher handle is kept in the position where the pair was first seen.
pub fn filter_candidates(raw: &[WindowState], rules: &FilterRules) -> Vec<WindowHandle> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut chosen: HashMap<(String, String), WindowHandle> = HashMap::new();

    for w in raw {
        if let Some(reason) = rules.rejection(w) {
            debug!(
                event = "core.window.candidate_rejected",
                handle = %w.handle,
                process = %w.process_name,
                reason = reason
            );
            continue;
        }

        let key = (w.process_name.clone(), w.title.clone());
        match chosen.get_mut(&key) {
            Some(existing) => {
                if w.handle > *existing {
                    *existing = w.handle;
                }
            }
            None => {
                chosen.insert(key.clone(), w.handle);
                order.push(key);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| chosen.get(&key).copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn win(handle: u64, process: &str, title: &str) -> WindowState {
        WindowState::new(handle, process, title, Rect::new(100, 100, 800, 600))
    }

    #[test]
    fn test_keeps_plain_windows_in_order() {
        let raw = vec![win(1, "code", "main.rs"), win(2, "chrome", "Docs")];
        let result = filter_candidates(&raw, &FilterRules::default());
        assert_eq!(result, vec![WindowHandle::new(1), WindowHandle::new(2)]);
    }

    #[test]
    fn test_rejects_hidden_small_and_system_windows() {
        let mut minimized = win(1, "code", "a");
        minimized.minimized = true;
        let mut tiny = win(2, "code", "b");
        tiny.rect = Rect::new(0, 0, 99, 400);
        let mut cloaked = win(3, "code", "c");
        cloaked.cloaked = true;
        let mut tool = win(4, "code", "d");
        tool.tool_window = true;
        let untitled = win(5, "code", "");
        let shell = win(6, "explorer", "x").with_class_name("Shell_TrayWnd");
        let progman = win(7, "explorer", "Program Manager");
        let pin = win(8, "PixPin", "pin");
        let mut status = win(9, "helper", "Status");
        status.rect = Rect::new(0, 0, 300, 300);
        let overlay = win(10, "snaplock", OVERLAY_TITLE);
        let keep = win(11, "code", "kept");

        let raw = vec![
            minimized, tiny, cloaked, tool, untitled, shell, progman, pin, status, overlay, keep,
        ];
        let result = filter_candidates(&raw, &FilterRules::default());
        assert_eq!(result, vec![WindowHandle::new(11)]);
    }

    #[test]
    fn test_overlay_handle_excluded() {
        let raw = vec![win(1, "code", "a"), win(2, "code", "b")];
        let rules = FilterRules::default().with_overlay(WindowHandle::new(2));
        assert_eq!(filter_candidates(&raw, &rules), vec![WindowHandle::new(1)]);
    }

    #[test]
    fn test_configured_titles_and_classes_excluded() {
        let raw = vec![
            win(1, "chrome", "Picture in picture"),
            win(2, "app", "x").with_class_name("Overlay"),
            win(3, "app", "y"),
        ];
        let mut rules = FilterRules::default();
        rules.ignored_titles.push("Picture in picture".to_string());
        rules.ignored_classes.push("Overlay".to_string());
        assert_eq!(filter_candidates(&raw, &rules), vec![WindowHandle::new(3)]);
    }

    #[test]
    fn test_duplicates_keep_higher_handle_at_first_position() {
        let raw = vec![
            win(5, "chrome", "Docs"),
            win(2, "code", "main.rs"),
            win(9, "chrome", "Docs"),
            win(7, "chrome", "Docs"),
        ];
        let result = filter_candidates(&raw, &FilterRules::default());
        assert_eq!(result, vec![WindowHandle::new(9), WindowHandle::new(2)]);
    }
}
