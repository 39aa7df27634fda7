use crate::config::types::SnaplockConfig;
use crate::errors::ConfigError;

/// Reject values that would make packing or restore misbehave.
pub fn validate_config(config: &SnaplockConfig) -> Result<(), ConfigError> {
    if config.layout.min_gap_extent() < 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "layout.min_gap_extent must not be negative (got {})",
                config.layout.min_gap_extent()
            ),
        });
    }

    if config.restore.retry_interval_ms() == 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: "restore.retry_interval_ms must be greater than 0".to_string(),
        });
    }

    if config.filter.min_window_extent() < 0 {
        return Err(ConfigError::InvalidConfiguration {
            message: format!(
                "filter.min_window_extent must not be negative (got {})",
                config.filter.min_window_extent()
            ),
        });
    }

    let empty_name = config
        .apps
        .browsers()
        .iter()
        .chain(config.apps.folder_browsers().iter())
        .any(|name| name.trim().is_empty());
    if empty_name {
        return Err(ConfigError::InvalidConfiguration {
            message: "apps entries must be non-empty process names".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SnaplockConfig::default()).is_ok());
    }

    #[test]
    fn test_negative_gap_extent_rejected() {
        let mut config = SnaplockConfig::default();
        config.layout.min_gap_extent = Some(-1);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("min_gap_extent"));
    }

    #[test]
    fn test_zero_retry_interval_rejected() {
        let mut config = SnaplockConfig::default();
        config.restore.retry_interval_ms = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_blank_app_name_rejected() {
        let mut config = SnaplockConfig::default();
        config.apps.browsers = Some(vec!["  ".to_string()]);
        assert!(validate_config(&config).is_err());
    }
}
