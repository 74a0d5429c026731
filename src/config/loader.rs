//! Configuration loading from disk and the process environment.
//!
//! Precedence: built-in defaults, then the TOML file (if any), then
//! environment variables. The result is validated before it is returned.

use alloy::primitives::Address;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ConfigValidationError};

/// Endpoint URL.
pub const ENV_RPC_URL: &str = "ELECTION_RPC_URL";
/// Endpoint URL, legacy name.
pub const ENV_WEB3_PROVIDER: &str = "WEB3_PROVIDER";
pub const ENV_CHAIN_ID: &str = "CHAIN_ID";
/// Comma-separated hex private keys.
pub const ENV_PRIVATE_KEY: &str = "PRIVATE_KEY";
pub const ENV_MANAGER_ADDRESS: &str = "MANAGER_CONTRACT_ADDRESS";
pub const ENV_AGGREGATOR_ADDRESS: &str = "AGGREGATOR_CONTRACT_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    NotFound(PathBuf),
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, message: String },
    Validation(Vec<ConfigValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => write!(f, "Config file not found: {}", path.display()),
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, message } => write!(f, "Invalid {}: {}", var, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from an optional TOML file plus the environment.
pub fn load(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => load_from_env(),
    }
}

/// Load, overlay and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: ClientConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

/// Defaults overlaid with the environment.
pub fn load_from_env() -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();
    apply_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment-style overrides read through `lookup`.
///
/// Unset and blank variables leave the current value untouched.
pub fn apply_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

    if let Some(url) = get(ENV_RPC_URL).or_else(|| get(ENV_WEB3_PROVIDER)) {
        config.rpc_url = url.trim().to_string();
    }

    if let Some(raw) = get(ENV_CHAIN_ID) {
        config.chain_id = raw.trim().parse().map_err(|e| ConfigError::Env {
            var: ENV_CHAIN_ID,
            message: format!("{e}"),
        })?;
    }

    if let Some(raw) = get(ENV_PRIVATE_KEY) {
        config.private_keys = parse_private_keys(&raw);
    }

    if let Some(raw) = get(ENV_MANAGER_ADDRESS) {
        config.manager_address = parse_address(ENV_MANAGER_ADDRESS, &raw)?;
    }
    if let Some(raw) = get(ENV_AGGREGATOR_ADDRESS) {
        config.aggregator_address = parse_address(ENV_AGGREGATOR_ADDRESS, &raw)?;
    }

    Ok(())
}

/// Split a comma-separated key list, dropping blank entries.
pub fn parse_private_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_address(var: &'static str, raw: &str) -> Result<Address, ConfigError> {
    raw.trim().parse().map_err(|e| ConfigError::Env {
        var,
        message: format!("{e}"),
    })
}
