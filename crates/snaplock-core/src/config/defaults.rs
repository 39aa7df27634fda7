//! Default values for configuration types.

use crate::config::types::Config;
use std::path::PathBuf;

pub const DEFAULT_MIN_GAP_EXTENT: i32 = 50;
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 500;

/// Combined with the 500ms interval this gives a relaunched application
/// roughly ten seconds to show its window.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 20;
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 500;

pub const DEFAULT_MIN_WINDOW_EXTENT: i32 = 100;

pub fn default_browsers() -> Vec<String> {
    vec!["msedge".to_string(), "chrome".to_string()]
}

pub fn default_folder_browsers() -> Vec<String> {
    vec!["explorer".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = resolve_data_dir();

        Self {
            data_dir,
            log_level: std::env::var("SNAPLOCK_LOG_LEVEL").unwrap_or("info".to_string()),
        }
    }
}

/// `SNAPLOCK_HOME` wins, then `~/.snaplock`, then a temp-dir fallback.
fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SNAPLOCK_HOME")
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }

    match dirs::home_dir() {
        Some(home) => home.join(".snaplock"),
        None => {
            tracing::error!(
                event = "core.config.home_dir_not_found",
                "Could not determine home directory - using temp dir fallback"
            );
            std::env::temp_dir().join(".snaplock")
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a runtime config rooted at an explicit directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            log_level: "info".to_string(),
        }
    }

    pub fn locks_file(&self) -> PathBuf {
        self.data_dir.join("locks.txt")
    }

    pub fn scenes_dir(&self) -> PathBuf {
        self.data_dir.join("scenes")
    }

    pub fn blacklist_file(&self) -> PathBuf {
        self.data_dir.join("blacklist.txt")
    }

    pub fn windows_snapshot_file(&self) -> PathBuf {
        self.data_dir.join("windows.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths_live_under_data_dir() {
        let config = Config::with_data_dir("/tmp/snaplock-test");
        assert_eq!(
            config.locks_file(),
            PathBuf::from("/tmp/snaplock-test/locks.txt")
        );
        assert_eq!(
            config.scenes_dir(),
            PathBuf::from("/tmp/snaplock-test/scenes")
        );
        assert_eq!(
            config.blacklist_file(),
            PathBuf::from("/tmp/snaplock-test/blacklist.txt")
        );
    }

    #[test]
    fn test_default_app_classes() {
        assert_eq!(default_browsers(), vec!["msedge", "chrome"]);
        assert_eq!(default_folder_browsers(), vec!["explorer"]);
    }
}
