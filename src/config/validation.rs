//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, chain id > 0)
//! - Check the endpoint is an http(s) URL and contract addresses are usable
//!
//! Returns all validation errors, not just the first. Private keys are
//! checked when accounts are loaded, so key material stays in the wallet.

use alloy::primitives::Address;
use std::fmt;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ConfigValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ConfigValidationError>> {
    let mut errors = Vec::new();

    match url::Url::parse(&config.rpc_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ConfigValidationError::new(
            "rpc_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ConfigValidationError::new("rpc_url", e.to_string())),
    }

    if config.chain_id == 0 {
        errors.push(ConfigValidationError::new("chain_id", "must be greater than 0"));
    }

    if config.manager_address == Address::ZERO {
        errors.push(ConfigValidationError::new("manager_address", "must not be the zero address"));
    }
    if config.aggregator_address == Address::ZERO {
        errors.push(ConfigValidationError::new("aggregator_address", "must not be the zero address"));
    }
    if config.manager_address == config.aggregator_address {
        errors.push(ConfigValidationError::new(
            "aggregator_address",
            "must differ from manager_address",
        ));
    }

    for (field, value) in [
        ("rpc_timeout_secs", config.rpc_timeout_secs),
        ("receipt_timeout_secs", config.receipt_timeout_secs),
        ("receipt_poll_interval_ms", config.receipt_poll_interval_ms),
    ] {
        if value == 0 {
            errors.push(ConfigValidationError::new(field, "must be greater than 0"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
