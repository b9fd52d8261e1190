use std::path::{Path, PathBuf};

use crate::config::schema::ConsoleConfig;
use crate::error::ConfigError;

pub const API_URL_ENV: &str = "SENTINELA_API_URL";
pub const LOG_ENV: &str = "SENTINELA_LOG";

const MAX_LOG_LINES: usize = 1000;

/// Format of a config document, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// `<config dir>/sentinela/console.yaml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("sentinela").join("console.yaml"))
        .ok_or(ConfigError::NoConfigDir)
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ConsoleConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content, ConfigFormat::from_path(path))
}

/// Loads the config at `path` if given, else the default path if it exists,
/// else built-in defaults. Environment overrides are applied last.
pub fn load_or_default(path: Option<&Path>) -> Result<ConsoleConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => match default_config_path() {
            Ok(default) if default.exists() => load_config(default)?,
            _ => ConsoleConfig::default(),
        },
    };

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

pub fn load_config_from_str(
    content: &str,
    format: ConfigFormat,
) -> Result<ConsoleConfig, ConfigError> {
    let config: ConsoleConfig = match format {
        // An empty YAML document means "all defaults".
        ConfigFormat::Yaml if content.trim().is_empty() => ConsoleConfig::default(),
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };

    validate_config(&config)?;

    Ok(config)
}

pub fn apply_env_overrides(config: &mut ConsoleConfig) {
    if let Some(url) = non_empty_env(API_URL_ENV) {
        config.api.base_url = url;
    }
    if let Some(level) = non_empty_env(LOG_ENV) {
        config.logging.level = level;
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate_config(config: &ConsoleConfig) -> Result<(), ConfigError> {
    let base_url = config.api.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::Validation {
            message: "api.base_url must not be empty".to_string(),
        });
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::Validation {
            message: format!(
                "api.base_url must start with http:// or https://, got '{}'",
                crate::sanitize::redact_url(base_url)
            ),
        });
    }

    if config.api.request_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "api.request_timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.monitor.poll_interval_ms == 0 {
        return Err(ConfigError::Validation {
            message: "monitor.poll_interval_ms must be greater than 0".to_string(),
        });
    }

    if config.monitor.log_lines == 0 || config.monitor.log_lines > MAX_LOG_LINES {
        return Err(ConfigError::Validation {
            message: format!(
                "monitor.log_lines must be between 1 and {}, got {}",
                MAX_LOG_LINES, config.monitor.log_lines
            ),
        });
    }

    if config.monitor.initial_percent > 100 {
        return Err(ConfigError::Validation {
            message: format!(
                "monitor.initial_percent must be at most 100, got {}",
                config.monitor.initial_percent
            ),
        });
    }

    Ok(())
}
