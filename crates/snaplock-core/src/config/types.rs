//! Configuration type definitions.
//!
//! These types are deserialized from TOML config files. Every tunable is
//! optional so that a project config can override a single value without
//! restating the rest; accessors fall back to the defaults in
//! [`super::defaults`].
//!
//! # Example Configuration
//!
//! ```toml
//! [layout]
//! min_gap_extent = 50
//!
//! [locks]
//! save_debounce_ms = 500
//!
//! [restore]
//! retry_attempts = 20
//! retry_interval_ms = 500
//!
//! [apps]
//! browsers = ["msedge", "chrome"]
//! folder_browsers = ["explorer"]
//!
//! [filter]
//! min_window_extent = 100
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults;

/// Runtime configuration derived from the environment, not from config files.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory for all snaplock data (default: ~/.snaplock)
    pub data_dir: PathBuf,
    /// Log level for the application
    pub log_level: String,
}

/// Main configuration loaded from TOML config files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SnaplockConfig {
    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub locks: LocksConfig,

    #[serde(default)]
    pub restore: RestoreConfig,

    #[serde(default)]
    pub apps: AppsConfig,

    #[serde(default)]
    pub filter: FilterConfig,
}

/// Gap packing settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LayoutConfig {
    /// Gaps whose width or height is at or below this many pixels are
    /// discarded after each locked-rect subtraction. Default: 50.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_gap_extent: Option<i32>,
}

impl LayoutConfig {
    pub fn min_gap_extent(&self) -> i32 {
        self.min_gap_extent
            .unwrap_or(defaults::DEFAULT_MIN_GAP_EXTENT)
    }
}

/// Lock persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocksConfig {
    /// Minimum delay between lock file writes while a session is live.
    /// Default: 500ms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_debounce_ms: Option<u64>,
}

impl LocksConfig {
    pub fn save_debounce_ms(&self) -> u64 {
        self.save_debounce_ms
            .unwrap_or(defaults::DEFAULT_SAVE_DEBOUNCE_MS)
    }
}

/// Scene restore retry settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RestoreConfig {
    /// Number of polls after relaunching a missing application. Default: 20.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,

    /// Delay between polls in milliseconds. Default: 500.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_interval_ms: Option<u64>,
}

impl RestoreConfig {
    pub fn retry_attempts(&self) -> u32 {
        self.retry_attempts
            .unwrap_or(defaults::DEFAULT_RETRY_ATTEMPTS)
    }

    pub fn retry_interval_ms(&self) -> u64 {
        self.retry_interval_ms
            .unwrap_or(defaults::DEFAULT_RETRY_INTERVAL_MS)
    }
}

/// Process-name classes that change how windows are identified.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppsConfig {
    /// Multi-document browsers, matched by domain or title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browsers: Option<Vec<String>>,

    /// Folder browsers, matched by their current folder path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_browsers: Option<Vec<String>>,
}

impl AppsConfig {
    pub fn browsers(&self) -> Vec<String> {
        self.browsers.clone().unwrap_or_else(defaults::default_browsers)
    }

    pub fn folder_browsers(&self) -> Vec<String> {
        self.folder_browsers
            .clone()
            .unwrap_or_else(defaults::default_folder_browsers)
    }
}

/// Candidate window filter settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilterConfig {
    /// Windows narrower or shorter than this are ignored. Default: 100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_window_extent: Option<i32>,

    /// Extra window titles to ignore, on top of the built-in system titles.
    #[serde(default)]
    pub ignored_titles: Vec<String>,

    /// Extra window classes to ignore, on top of the built-in shell classes.
    #[serde(default)]
    pub ignored_classes: Vec<String>,
}

impl FilterConfig {
    pub fn min_window_extent(&self) -> i32 {
        self.min_window_extent
            .unwrap_or(defaults::DEFAULT_MIN_WINDOW_EXTENT)
    }
}
