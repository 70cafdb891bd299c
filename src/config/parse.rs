use super::types::*;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let yaml_string = fs::read_to_string(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    let config = parse_config(&yaml_string).map_err(|e| match e {
        ConfigError::YamlParse(e) => ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("in file '{}': {}", path.display(), e),
        )),
        other => other,
    })?;

    tracing::debug!(config_path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Parse and validate a YAML document. An empty document yields the defaults.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let config: Config = if yaml.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    // GetLogEvents accepts 1..=10000
    if config.tail.fetch_limit == 0 || config.tail.fetch_limit > 10_000 {
        errors.push(format!(
            "tail.fetch_limit must be between 1 and 10000, got {}",
            config.tail.fetch_limit
        ));
    }

    if config.tail.idle_backoff.is_zero() {
        errors.push("tail.idle_backoff must be greater than zero".to_string());
    }

    if config.discovery.interval.is_zero() {
        errors.push("discovery.interval must be greater than zero".to_string());
    }

    if config.discovery.activity_window.is_zero() {
        errors.push("discovery.activity_window must be greater than zero".to_string());
    }

    if chrono::Duration::from_std(config.discovery.activity_window).is_err() {
        errors.push("discovery.activity_window is too large".to_string());
    }

    if config.discovery.max_tailers == Some(0) {
        errors.push("discovery.max_tailers must be at least 1 when set".to_string());
    }

    if config.output.queue_capacity == 0 {
        errors.push("output.queue_capacity must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}
