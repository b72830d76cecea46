use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use log::debug;

use crate::config::schema::{ClientConfig, ResolvedConfig};
use crate::error::ConfigError;
use crate::secrets::{has_secret_source, resolve_secret};

/// Overrides `apiBase` when set.
pub const API_BASE_ENV_VAR: &str = "JOURNAL_API_BASE";

/// Overrides every configured shared key source when set.
pub const SHARED_KEY_ENV_VAR: &str = "JOURNAL_SHARED_KEY";

/// `<platform config dir>/progress-journal/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("progress-journal").join("config.json"))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ClientConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = serde_json::from_str(content)?;
    Ok(config)
}

/// Applies environment overrides, validates, and resolves the shared key.
pub fn resolve(mut config: ClientConfig) -> Result<ResolvedConfig, ConfigError> {
    if let Ok(api_base) = std::env::var(API_BASE_ENV_VAR) {
        if !api_base.trim().is_empty() {
            debug!("apiBase overridden by {}", API_BASE_ENV_VAR);
            config.api_base = api_base.trim().to_string();
        }
    }

    let key_override = std::env::var(SHARED_KEY_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty());
    if key_override.is_some() {
        debug!("shared key overridden by {}", SHARED_KEY_ENV_VAR);
        config.shared_key = None;
        config.shared_key_file = None;
        config.shared_key_env_var = Some(SHARED_KEY_ENV_VAR.to_string());
    }

    validate_config(&config)?;

    let shared_key = resolve_secret(
        config.shared_key.as_deref(),
        config.shared_key_file.as_deref(),
        config.shared_key_env_var.as_deref(),
    )?;

    let utc_offset = match config.timezone_offset_minutes {
        Some(minutes) => Some(FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            ConfigError::Validation {
                message: format!("timezoneOffsetMinutes out of range: {}", minutes),
            }
        })?),
        None => None,
    };

    Ok(ResolvedConfig {
        api_base: config.api_base.trim_end_matches('/').to_string(),
        shared_key,
        data_directory: config.data_directory.map(PathBuf::from),
        request_timeout: config.request_timeout_secs.map(Duration::from_secs),
        connect_timeout: Duration::from_secs(config.connect_timeout_secs),
        utc_offset,
    })
}

fn validate_config(config: &ClientConfig) -> Result<(), ConfigError> {
    let api_base = config.api_base.trim();
    if api_base.is_empty() {
        return Err(ConfigError::Validation {
            message: "apiBase is required".to_string(),
        });
    }

    if !(api_base.starts_with("https://") || api_base.starts_with("http://")) {
        return Err(ConfigError::Validation {
            message: format!("apiBase must be an http(s) URL, got '{}'", api_base),
        });
    }

    if !has_secret_source(
        config.shared_key.as_deref(),
        config.shared_key_file.as_deref(),
        config.shared_key_env_var.as_deref(),
    ) {
        return Err(ConfigError::Validation {
            message: "one of sharedKey, sharedKeyFile or sharedKeyEnvVar is required".to_string(),
        });
    }

    if config.request_timeout_secs == Some(0) {
        return Err(ConfigError::Validation {
            message: "requestTimeoutSecs must be greater than zero".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    fn clear_overrides() {
        std::env::remove_var(API_BASE_ENV_VAR);
        std::env::remove_var(SHARED_KEY_ENV_VAR);
    }

    #[test]
    fn test_load_config_defaults() {
        let config = load_config_from_str(
            r#"{ "apiBase": "https://example.com/exec", "sharedKey": "K" }"#,
        )
        .unwrap();
        assert_eq!(config.api_base, "https://example.com/exec");
        assert_eq!(config.connect_timeout_secs, 10);
        assert!(config.request_timeout_secs.is_none());
        assert!(config.data_directory.is_none());
    }

    #[test]
    fn test_load_config_rejects_bad_json() {
        let result = load_config_from_str("{ not json");
        assert!(matches!(result, Err(ConfigError::ParseJson(_))));
    }

    #[test]
    #[serial]
    fn test_resolve_valid_config() {
        clear_overrides();
        let config = load_config_from_str(
            r#"{
                "apiBase": "https://example.com/exec/",
                "sharedKey": "JOURNAL_KEY",
                "requestTimeoutSecs": 30,
                "timezoneOffsetMinutes": -300
            }"#,
        )
        .unwrap();

        let resolved = resolve(config).unwrap();
        assert_eq!(resolved.api_base, "https://example.com/exec");
        assert_eq!(resolved.shared_key.expose_secret(), "JOURNAL_KEY");
        assert_eq!(resolved.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(resolved.utc_offset, FixedOffset::west_opt(5 * 3600));
    }

    #[test]
    #[serial]
    fn test_resolve_requires_api_base() {
        clear_overrides();
        let config = load_config_from_str(r#"{ "sharedKey": "K" }"#).unwrap();
        assert!(matches!(resolve(config), Err(ConfigError::Validation { .. })));
    }

    #[test]
    #[serial]
    fn test_resolve_rejects_non_http_api_base() {
        clear_overrides();
        let config =
            load_config_from_str(r#"{ "apiBase": "ftp://example.com", "sharedKey": "K" }"#)
                .unwrap();
        assert!(matches!(resolve(config), Err(ConfigError::Validation { .. })));
    }

    #[test]
    #[serial]
    fn test_resolve_requires_key_source() {
        clear_overrides();
        let config = load_config_from_str(r#"{ "apiBase": "https://example.com" }"#).unwrap();
        assert!(matches!(resolve(config), Err(ConfigError::Validation { .. })));
    }

    #[test]
    #[serial]
    fn test_env_overrides_take_precedence() {
        clear_overrides();
        std::env::set_var(API_BASE_ENV_VAR, "https://override.example.com/exec");
        std::env::set_var(SHARED_KEY_ENV_VAR, "FROM_ENV");

        let config = load_config_from_str(
            r#"{ "apiBase": "https://example.com/exec", "sharedKey": "FROM_FILE" }"#,
        )
        .unwrap();
        let resolved = resolve(config).unwrap();

        assert_eq!(resolved.api_base, "https://override.example.com/exec");
        assert_eq!(resolved.shared_key.expose_secret(), "FROM_ENV");
        clear_overrides();
    }

    #[test]
    #[serial]
    fn test_zero_timeout_rejected() {
        clear_overrides();
        let config = load_config_from_str(
            r#"{ "apiBase": "https://example.com", "sharedKey": "K", "requestTimeoutSecs": 0 }"#,
        )
        .unwrap();
        assert!(matches!(resolve(config), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let result = load_config("/nonexistent/progress-journal/config.json");
        match result {
            Err(ConfigError::ReadFile { path, .. }) => {
                assert!(path.ends_with("config.json"));
            }
            other => panic!("expected ReadFile error, got {:?}", other),
        }
    }
}
