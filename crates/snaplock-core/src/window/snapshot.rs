//! In-memory desktop backed by a JSON snapshot file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::geometry::Rect;
use crate::window::errors::WindowError;
use crate::window::filter::{FilterRules, filter_candidates};
use crate::window::ports::{IdentityTextSource, WindowSystem};
use crate::window::types::{WindowHandle, WindowState};

/// On-disk shape of a desktop description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopSnapshot {
    pub work_area: Rect,
    #[serde(default)]
    pub windows: Vec<WindowState>,
}

/// [`WindowSystem`] and [`IdentityTextSource`] over a [`DesktopSnapshot`].
///
/// Moves update the stored rects, so a layout pass can be planned, written
/// back with [`SnapshotWindowSystem::save`], and inspected.
pub struct SnapshotWindowSystem {
    path: Option<PathBuf>,
    rules: FilterRules,
    state: Mutex<DesktopSnapshot>,
    moves: Mutex<Vec<(WindowHandle, Rect)>>,
}

impl SnapshotWindowSystem {
    pub fn new(snapshot: DesktopSnapshot) -> Self {
        Self {
            path: None,
            rules: FilterRules::default(),
            state: Mutex::new(snapshot),
            moves: Mutex::new(Vec::new()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, WindowError> {
        let content = std::fs::read_to_string(path).map_err(|e| WindowError::SnapshotIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        let snapshot: DesktopSnapshot =
            serde_json::from_str(&content).map_err(|e| WindowError::SnapshotParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        info!(
            event = "core.snapshot.load_completed",
            path = %path.display(),
            windows = snapshot.windows.len()
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            rules: FilterRules::default(),
            state: Mutex::new(snapshot),
            moves: Mutex::new(Vec::new()),
        })
    }

    pub fn with_rules(mut self, rules: FilterRules) -> Self {
        self.rules = rules;
        self
    }

    /// Write the current state back to the file it was loaded from.
    ///
    /// Goes through a sibling `.tmp` file and a rename, so readers never see
    /// a half-written snapshot.
    pub fn save(&self) -> Result<(), WindowError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let snapshot = self.snapshot();
        let json = serde_json::to_string_pretty(&snapshot).map_err(|e| {
            WindowError::SnapshotParse {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;

        let temp_file = temp_path(path);
        if let Err(e) = std::fs::write(&temp_file, json) {
            cleanup_temp_file(&temp_file, &e);
            return Err(WindowError::SnapshotIo {
                path: path.clone(),
                source: e,
            });
        }
        if let Err(e) = std::fs::rename(&temp_file, path) {
            cleanup_temp_file(&temp_file, &e);
            return Err(WindowError::SnapshotIo {
                path: path.clone(),
                source: e,
            });
        }
        debug!(event = "core.snapshot.save_completed", path = %path.display());
        Ok(())
    }

    pub fn snapshot(&self) -> DesktopSnapshot {
        self.lock().clone()
    }

    pub fn work_area(&self) -> Rect {
        self.lock().work_area
    }

    pub fn insert(&self, window: WindowState) {
        let mut state = self.lock();
        state.windows.retain(|w| w.handle != window.handle);
        state.windows.push(window);
    }

    pub fn remove(&self, handle: WindowHandle) -> bool {
        let mut state = self.lock();
        let before = state.windows.len();
        state.windows.retain(|w| w.handle != handle);
        state.windows.len() != before
    }

    pub fn set_title(&self, handle: WindowHandle, title: impl Into<String>) {
        if let Some(w) = self.lock().windows.iter_mut().find(|w| w.handle == handle) {
            w.title = title.into();
        }
    }

    pub fn set_identity_text(&self, handle: WindowHandle, text: Option<String>) {
        if let Some(w) = self.lock().windows.iter_mut().find(|w| w.handle == handle) {
            w.identity_text = text;
        }
    }

    /// Successful moves in call order, as `(handle, visible target)`.
    pub fn moves(&self) -> Vec<(WindowHandle, Rect)> {
        self.moves
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Logical rect including the invisible frame.
    pub fn logical_rect(&self, handle: WindowHandle) -> Option<Rect> {
        self.find(handle, |w| w.frame.expand(w.rect))
    }

    fn find<T>(&self, handle: WindowHandle, f: impl FnOnce(&WindowState) -> T) -> Option<T> {
        self.lock().windows.iter().find(|w| w.handle == handle).map(f)
    }

    fn lock(&self) -> MutexGuard<'_, DesktopSnapshot> {
        // A panic while holding the lock cannot leave the snapshot half
        // written, so recover the data instead of propagating the poison.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WindowSystem for SnapshotWindowSystem {
    fn enumerate_candidate_windows(&self) -> Result<Vec<WindowHandle>, WindowError> {
        let state = self.lock();
        let handles = filter_candidates(&state.windows, &self.rules);
        debug!(
            event = "core.snapshot.enumerated",
            raw = state.windows.len(),
            candidates = handles.len()
        );
        Ok(handles)
    }

    fn is_window(&self, handle: WindowHandle) -> bool {
        self.find(handle, |_| ()).is_some()
    }

    fn process_name(&self, handle: WindowHandle) -> String {
        self.find(handle, |w| w.process_name.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    fn window_title(&self, handle: WindowHandle) -> String {
        self.find(handle, |w| w.title.clone()).unwrap_or_default()
    }

    fn visible_rect(&self, handle: WindowHandle) -> Rect {
        self.find(handle, |w| w.rect).unwrap_or_default()
    }

    fn executable_path(&self, handle: WindowHandle) -> Option<String> {
        self.find(handle, |w| w.exec_path.clone()).flatten()
    }

    fn move_window_compensated(
        &self,
        handle: WindowHandle,
        target: Rect,
    ) -> Result<(), WindowError> {
        let mut state = self.lock();
        let Some(window) = state.windows.iter_mut().find(|w| w.handle == handle) else {
            warn!(event = "core.snapshot.move_missing_window", handle = %handle);
            return Err(WindowError::WindowGone { handle });
        };

        let logical = window.frame.expand(window.rect);
        let moved = crate::window::frame::compensated_target(logical, window.rect, target);
        window.rect = window.frame.shrink(moved);
        drop(state);

        self.moves
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((handle, target));
        Ok(())
    }
}

impl IdentityTextSource for SnapshotWindowSystem {
    fn auxiliary_identity_text(&self, handle: WindowHandle) -> Option<String> {
        self.find(handle, |w| w.identity_text.clone())
            .flatten()
            .filter(|t| !t.is_empty())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn cleanup_temp_file(temp_file: &Path, original_error: &std::io::Error) {
    if let Err(cleanup_err) = std::fs::remove_file(temp_file) {
        warn!(
            event = "core.snapshot.temp_file_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err
        );
    }
}
