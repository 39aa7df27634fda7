use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::debug;

use super::title::clean_title;
use super::types::{AppClasses, Fingerprint, WindowRecord};
use crate::window::{IdentityTextSource, WindowHandle, WindowSystem};

static HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9][-a-zA-Z0-9]{0,62}(\.[a-zA-Z0-9][-a-zA-Z0-9]{0,62})+")
        .expect("valid host regex")
});

/// First host-like token in `text`, lowercased.
pub fn extract_host(text: &str) -> Option<String> {
    HOST.find(text).map(|m| m.as_str().to_lowercase())
}

/// Turn browser address-bar text into a URL that can be relaunched.
///
/// Returns `None` when the text does not look like an address at all.
pub fn normalize_browser_url(text: &str) -> Option<String> {
    let text = text.trim();
    if text.starts_with("http") || text.starts_with("file:") {
        return Some(text.to_string());
    }
    if text.contains('.') && !text.contains(' ') {
        return Some(format!("https://{text}"));
    }
    None
}

/// Derives fingerprints for live windows and matches them against records.
///
/// Holds only shared read-only ports, so clones are cheap and can be moved
/// into retry workers.
#[derive(Clone)]
pub struct IdentityMatcher {
    windows: Arc<dyn WindowSystem>,
    identity: Arc<dyn IdentityTextSource>,
    classes: AppClasses,
}

impl IdentityMatcher {
    pub fn new(
        windows: Arc<dyn WindowSystem>,
        identity: Arc<dyn IdentityTextSource>,
        classes: AppClasses,
    ) -> Self {
        Self {
            windows,
            identity,
            classes,
        }
    }

    pub fn windows(&self) -> &Arc<dyn WindowSystem> {
        &self.windows
    }

    pub fn classes(&self) -> &AppClasses {
        &self.classes
    }

    pub fn fingerprint(&self, handle: WindowHandle) -> Fingerprint {
        Fingerprint {
            process_name: self.windows.process_name(handle),
            match_key: self.match_key(handle),
        }
    }

    /// `domain:<host>` for browsers with a readable address, otherwise
    /// `title:<cleaned title>`.
    pub fn match_key(&self, handle: WindowHandle) -> String {
        let process = self.windows.process_name(handle);
        if self.classes.is_browser(&process)
            && let Some(host) = self
                .identity
                .auxiliary_identity_text(handle)
                .as_deref()
                .and_then(extract_host)
        {
            return format!("domain:{host}");
        }
        format!("title:{}", clean_title(&self.windows.window_title(handle)))
    }

    /// Whether the live window `handle` is the window `record` describes.
    ///
    /// Same process is required. Folder browsers with a saved path match on
    /// that path alone. Other non-browsers match on process. Browsers try the
    /// match key, then the exact cleaned title, then a cleaned-title substring.
    pub fn is_match(&self, handle: WindowHandle, record: &WindowRecord) -> bool {
        let process = self.windows.process_name(handle);
        if process.to_lowercase() != record.process_name.to_lowercase() {
            return false;
        }

        if self.classes.is_folder_browser(&process) && !record.url.is_empty() {
            let current = self
                .identity
                .auxiliary_identity_text(handle)
                .unwrap_or_default();
            return !current.is_empty() && current.to_lowercase() == record.url.to_lowercase();
        }

        if !self.classes.is_browser(&process) {
            return true;
        }

        if !record.match_key.is_empty() && self.match_key(handle) == record.match_key {
            return true;
        }

        let live = clean_title(&self.windows.window_title(handle));
        let saved = clean_title(&record.title);
        if live == saved {
            return true;
        }
        !saved.is_empty() && live.contains(&saved)
    }

    /// Snapshot the live identity of `handle` with its current visible rect.
    pub fn capture(&self, handle: WindowHandle) -> WindowRecord {
        let process_name = self.windows.process_name(handle);
        let title = self.windows.window_title(handle);
        let rect = self.windows.visible_rect(handle);
        let exec_path = self.windows.executable_path(handle).unwrap_or_default();

        let url = if self.classes.is_browser(&process_name) {
            self.identity
                .auxiliary_identity_text(handle)
                .as_deref()
                .and_then(normalize_browser_url)
                .unwrap_or_default()
        } else if self.classes.is_folder_browser(&process_name) {
            self.identity
                .auxiliary_identity_text(handle)
                .unwrap_or_default()
        } else {
            String::new()
        };

        let record = WindowRecord {
            match_key: self.match_key(handle),
            process_name,
            title,
            rect,
            exec_path,
            url,
        };

        debug!(
            event = "core.identity.captured",
            handle = %handle,
            fingerprint = %record.fingerprint()
        );
        record
    }

    /// First handle in `handles` that matches `record`.
    pub fn find_match(
        &self,
        handles: &[WindowHandle],
        record: &WindowRecord,
    ) -> Option<WindowHandle> {
        handles.iter().copied().find(|h| self.is_match(*h, record))
    }
}
