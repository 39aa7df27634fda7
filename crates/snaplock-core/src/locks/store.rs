use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::errors::LockError;
use super::persistence::{load_locks, save_locks};
use crate::geometry::Rect;
use crate::identity::{IdentityMatcher, LockEntry};
use crate::window::WindowHandle;

/// Split of one enumeration into locked and free windows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockResolution {
    /// Handle and target rect, in handle order.
    pub locked: Vec<(WindowHandle, Rect)>,
    pub normals: Vec<WindowHandle>,
    /// `used[i]` is true when entry `i` claimed a handle in this pass.
    pub used: Vec<bool>,
}

impl LockResolution {
    pub fn used_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.used
            .iter()
            .enumerate()
            .filter_map(|(i, used)| used.then_some(i))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Locked(LockEntry),
    Unlocked(LockEntry),
}

/// Ordered lock entries plus the file they persist to.
///
/// The in-memory list is authoritative; a failed save is logged and the
/// store stays dirty so the next flush retries.
#[derive(Debug)]
pub struct LockStore {
    path: PathBuf,
    entries: Vec<LockEntry>,
    dirty: bool,
}

impl LockStore {
    /// Load from `path`. Read failures are logged and yield an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match load_locks(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    event = "core.locks.load_failed",
                    file = %path.display(),
                    error = %e
                );
                Vec::new()
            }
        };
        Self {
            path,
            entries,
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[LockEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Assign each handle to the first entry, in list order, that is still
    /// unclaimed and matches it. Unassigned handles are normals.
    pub fn resolve_assignment(
        &self,
        handles: &[WindowHandle],
        matcher: &IdentityMatcher,
    ) -> LockResolution {
        let mut used = vec![false; self.entries.len()];
        let mut locked = Vec::new();
        let mut normals = Vec::new();

        for &handle in handles {
            let hit = self
                .entries
                .iter()
                .enumerate()
                .find(|(i, entry)| !used[*i] && matcher.is_match(handle, entry));

            match hit {
                Some((i, entry)) => {
                    used[i] = true;
                    locked.push((handle, entry.rect));
                }
                None => normals.push(handle),
            }
        }

        LockResolution {
            locked,
            normals,
            used,
        }
    }

    /// Index of the first entry matching `handle`.
    pub fn find(&self, handle: WindowHandle, matcher: &IdentityMatcher) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| matcher.is_match(handle, entry))
    }

    /// Unlock `handle` if an entry matches it, otherwise lock it at its
    /// current visible rect.
    pub fn toggle(&mut self, handle: WindowHandle, matcher: &IdentityMatcher) -> ToggleOutcome {
        self.dirty = true;

        if let Some(index) = self.find(handle, matcher) {
            let entry = self.entries.remove(index);
            info!(
                event = "core.locks.unlocked",
                handle = %handle,
                fingerprint = %entry.fingerprint()
            );
            return ToggleOutcome::Unlocked(entry);
        }

        let entry = matcher.capture(handle);
        info!(
            event = "core.locks.locked",
            handle = %handle,
            fingerprint = %entry.fingerprint(),
            rect = %entry.rect
        );
        self.entries.push(entry.clone());
        ToggleOutcome::Locked(entry)
    }

    /// Store `rect` on the entry matching `handle`. Returns whether anything changed.
    pub fn refresh_rect(
        &mut self,
        handle: WindowHandle,
        rect: Rect,
        matcher: &IdentityMatcher,
    ) -> bool {
        let Some(index) = self.find(handle, matcher) else {
            return false;
        };
        self.set_rect(index, rect)
    }

    /// Set the rect of entry `index`. Returns whether it changed.
    pub fn set_rect(&mut self, index: usize, rect: Rect) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };
        if entry.rect == rect {
            return false;
        }
        entry.rect = rect;
        self.dirty = true;
        true
    }

    pub fn remove(&mut self, index: usize) -> Result<LockEntry, LockError> {
        if index >= self.entries.len() {
            return Err(LockError::EntryNotFound {
                index,
                count: self.entries.len(),
            });
        }
        self.dirty = true;
        Ok(self.entries.remove(index))
    }

    pub fn save(&mut self) -> Result<(), LockError> {
        save_locks(&self.path, &self.entries)?;
        self.dirty = false;
        Ok(())
    }

    /// Save when dirty. Failures are logged and leave the store dirty.
    pub fn flush_if_dirty(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        match self.save() {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    event = "core.locks.save_failed",
                    file = %self.path.display(),
                    error = %e,
                    message = "Keeping locks in memory until the next save"
                );
                false
            }
        }
    }
}
