//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "ITEM_GATEWAY_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {key}")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: file (if any), then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment-style settings onto `config`.
///
/// `lookup` resolves a variable name to its value; the process
/// environment in production, a map in tests.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("GRPC_HOST") {
        config.backend.host = host;
    }
    if let Some(port) = parse_var(&lookup, "GRPC_PORT")? {
        config.backend.port = port;
    }
    if let Some(addr) = lookup("GATEWAY_BIND") {
        config.listener.bind_address = addr;
    }
    if let Some(addr) = lookup("RPC_BIND") {
        config.rpc.bind_address = addr;
    }
    if let Some(threshold) = parse_var(&lookup, "BREAKER_FAILURE_THRESHOLD")? {
        config.breaker.failure_threshold = threshold;
    }
    if let Some(secs) = parse_var(&lookup, "BREAKER_RESET_TIMEOUT_SECS")? {
        config.breaker.reset_timeout_secs = secs;
    }
    if let Some(attempts) = parse_var(&lookup, "RETRY_MAX_ATTEMPTS")? {
        config.retries.max_attempts = attempts;
    }
    if let Some(raw) = lookup("RETRY_DELAYS_MS") {
        config.retries.delays_ms = raw
            .split(',')
            .map(|part| part.trim().parse::<u64>())
            .collect::<Result<_, _>>()
            .map_err(|_| ConfigError::Env {
                key: "RETRY_DELAYS_MS",
                value: raw.clone(),
            })?;
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    Ok(())
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { key, value }),
        None => Ok(None),
    }
}
