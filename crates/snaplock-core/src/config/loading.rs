//! Configuration loading and merging logic.
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.snaplock/config.toml`
//! 3. **Project config** - `./.snaplock/config.toml`

use crate::config::types::{
    AppsConfig, FilterConfig, LayoutConfig, LocksConfig, RestoreConfig, SnaplockConfig,
};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;
use std::fs;
use std::path::Path;

/// Load configuration from the hierarchy of config files.
///
/// # Errors
///
/// Returns an error if a config file exists but cannot be read or parsed,
/// or if validation fails. Missing config files are not errors.
pub fn load_hierarchy() -> Result<SnaplockConfig, ConfigError> {
    let mut config = SnaplockConfig::default();

    match load_user_config() {
        Ok(user_config) => config = merge_configs(config, user_config),
        Err(ConfigError::ConfigNotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    match load_project_config() {
        Ok(project_config) => config = merge_configs(config, project_config),
        Err(ConfigError::ConfigNotFound { .. }) => {}
        Err(e) => return Err(e),
    }

    validate_config(&config)?;

    tracing::debug!(
        event = "core.config.load_completed",
        min_gap_extent = config.layout.min_gap_extent(),
        retry_attempts = config.restore.retry_attempts()
    );

    Ok(config)
}

fn load_user_config() -> Result<SnaplockConfig, ConfigError> {
    let Some(home_dir) = dirs::home_dir() else {
        return Err(ConfigError::ConfigNotFound {
            path: "~/.snaplock/config.toml".to_string(),
        });
    };
    load_config_file(&home_dir.join(".snaplock").join("config.toml"))
}

fn load_project_config() -> Result<SnaplockConfig, ConfigError> {
    let current_dir = std::env::current_dir().map_err(|source| ConfigError::IoError {
        path: ".".to_string(),
        source,
    })?;
    load_config_file(&current_dir.join(".snaplock").join("config.toml"))
}

/// Load a configuration file from the given path.
pub fn load_config_file(path: &Path) -> Result<SnaplockConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::ConfigNotFound {
                path: path.display().to_string(),
            }
        } else {
            ConfigError::IoError {
                path: path.display().to_string(),
                source,
            }
        }
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Merge two configurations, with `override_config` taking precedence.
///
/// Optional values replace base values only when present. Filter deny
/// lists are concatenated.
pub fn merge_configs(base: SnaplockConfig, override_config: SnaplockConfig) -> SnaplockConfig {
    SnaplockConfig {
        layout: LayoutConfig {
            min_gap_extent: override_config
                .layout
                .min_gap_extent
                .or(base.layout.min_gap_extent),
        },
        locks: LocksConfig {
            save_debounce_ms: override_config
                .locks
                .save_debounce_ms
                .or(base.locks.save_debounce_ms),
        },
        restore: RestoreConfig {
            retry_attempts: override_config
                .restore
                .retry_attempts
                .or(base.restore.retry_attempts),
            retry_interval_ms: override_config
                .restore
                .retry_interval_ms
                .or(base.restore.retry_interval_ms),
        },
        apps: AppsConfig {
            browsers: override_config.apps.browsers.or(base.apps.browsers),
            folder_browsers: override_config
                .apps
                .folder_browsers
                .or(base.apps.folder_browsers),
        },
        filter: FilterConfig {
            min_window_extent: override_config
                .filter
                .min_window_extent
                .or(base.filter.min_window_extent),
            ignored_titles: {
                let mut merged = base.filter.ignored_titles;
                merged.extend(override_config.filter.ignored_titles);
                merged
            },
            ignored_classes: {
                let mut merged = base.filter.ignored_classes;
                merged.extend(override_config.filter.ignored_classes);
                merged
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SnaplockError;

    #[test]
    fn test_merge_prefers_override_values() {
        let base: SnaplockConfig = toml::from_str(
            r#"
[layout]
min_gap_extent = 40

[restore]
retry_attempts = 10
retry_interval_ms = 250
"#,
        )
        .unwrap();
        let override_config: SnaplockConfig = toml::from_str(
            r#"
[restore]
retry_attempts = 3
"#,
        )
        .unwrap();

        let merged = merge_configs(base, override_config);
        assert_eq!(merged.layout.min_gap_extent(), 40);
        assert_eq!(merged.restore.retry_attempts(), 3);
        assert_eq!(merged.restore.retry_interval_ms(), 250);
    }

    #[test]
    fn test_merge_concatenates_filter_lists() {
        let mut base = SnaplockConfig::default();
        base.filter.ignored_titles = vec!["Status".to_string()];
        let mut override_config = SnaplockConfig::default();
        override_config.filter.ignored_titles = vec!["Picture-in-picture".to_string()];

        let merged = merge_configs(base, override_config);
        assert_eq!(
            merged.filter.ignored_titles,
            vec!["Status".to_string(), "Picture-in-picture".to_string()]
        );
    }

    #[test]
    fn test_load_config_file_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_file(&dir.path().join("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigNotFound { .. }));
        assert_eq!(err.error_code(), "CONFIG_NOT_FOUND");
    }

    #[test]
    fn test_load_config_file_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[layout\nmin_gap_extent = ").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.is_user_error());
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_config_file_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_file(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_load_config_file_reads_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[locks]\nsave_debounce_ms = 900\n").unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.locks.save_debounce_ms(), 900);
    }
}
