//! Process names excluded from layout.
//!
//! The list lives in `<data_dir>/blacklist.txt`, one process name per line.
//! [`Blacklist`] owns the parsed cache; the service reloads it at the start
//! of every invocation so edits made in an external editor are picked up.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::window::{WindowHandle, WindowSystem};

#[derive(Debug, Clone)]
pub struct Blacklist {
    path: PathBuf,
    names: Vec<String>,
    cache: HashSet<String>,
}

impl Blacklist {
    /// Load from `path`. A missing or unreadable file yields an empty list.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut blacklist = Self {
            path: path.into(),
            names: Vec::new(),
            cache: HashSet::new(),
        };
        blacklist.reload();
        blacklist
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn reload(&mut self) {
        self.names.clear();
        self.cache.clear();

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(event = "core.blacklist.file_missing", path = %self.path.display());
                return;
            }
            Err(e) => {
                warn!(
                    event = "core.blacklist.read_failed",
                    path = %self.path.display(),
                    error = %e
                );
                return;
            }
        };

        for line in content.lines() {
            let name = line.trim();
            if name.is_empty() {
                continue;
            }
            if self.cache.insert(name.to_lowercase()) {
                self.names.push(name.to_string());
            }
        }

        debug!(event = "core.blacklist.reloaded", count = self.names.len());
    }

    pub fn contains(&self, process_name: &str) -> bool {
        self.cache.contains(&process_name.trim().to_lowercase())
    }

    /// Names in file order, as written.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Append `process_name` to the file. Returns `false` if it was already listed.
    pub fn add(&mut self, process_name: &str) -> std::io::Result<bool> {
        let name = process_name.trim();
        if name.is_empty() || self.contains(name) {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let needs_newline = fs::read(&self.path)
            .map(|bytes| bytes.last().is_some_and(|b| *b != b'\n'))
            .unwrap_or(false);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if needs_newline {
            writeln!(file)?;
        }
        writeln!(file, "{name}")?;

        self.cache.insert(name.to_lowercase());
        self.names.push(name.to_string());

        info!(event = "core.blacklist.added", process = name);
        Ok(true)
    }

    /// Drop handles whose owning process is blacklisted, preserving order.
    pub fn retain_allowed(
        &self,
        handles: Vec<WindowHandle>,
        windows: &dyn WindowSystem,
    ) -> Vec<WindowHandle> {
        if self.cache.is_empty() {
            return handles;
        }
        handles
            .into_iter()
            .filter(|h| !self.contains(&windows.process_name(*h)))
            .collect()
    }
}
