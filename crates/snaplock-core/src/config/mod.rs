//! # Configuration System
//!
//! Hierarchical TOML configuration for snaplock.
//!
//! ## Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.snaplock/config.toml` (global user preferences)
//! 3. **Project config** - `./.snaplock/config.toml` (local overrides)
//!
//! ## Usage Example
//!
//! ```toml
//! # ~/.snaplock/config.toml
//! [layout]
//! min_gap_extent = 50
//!
//! [restore]
//! retry_attempts = 20
//! retry_interval_ms = 500
//!
//! [apps]
//! browsers = ["msedge", "chrome", "firefox"]
//! folder_browsers = ["explorer"]
//! ```
//!
//! ## Loading Configuration
//!
//! ```rust,no_run
//! use snaplock_core::config::SnaplockConfig;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SnaplockConfig::load_hierarchy()?;
//!     let attempts = config.restore.retry_attempts();
//!     Ok(())
//! }
//! ```

pub mod defaults;
pub mod loading;
pub mod types;
pub mod validation;

pub use types::{
    AppsConfig, Config, FilterConfig, LayoutConfig, LocksConfig, RestoreConfig, SnaplockConfig,
};
pub use validation::validate_config;

impl SnaplockConfig {
    /// Load configuration from the hierarchy of config files.
    ///
    /// See [`loading::load_hierarchy`] for details.
    pub fn load_hierarchy() -> Result<Self, crate::errors::ConfigError> {
        loading::load_hierarchy()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), crate::errors::ConfigError> {
        validation::validate_config(self)
    }
}
