//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Non-empty network list with unique names
//! - Parsable http(s) endpoints, non-zero ports
//! - Positive round budget and request timeout
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Web3Config → Result<(), Vec<ValidationError>>

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::Web3Config;

/// A single semantic problem in a configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("at least one network must be configured")]
    NoNetworks,

    #[error("network #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("network '{name}' is configured more than once")]
    DuplicateName { name: String },

    #[error("network '{name}' has invalid url '{url}': {reason}")]
    InvalidUrl {
        name: String,
        url: String,
        reason: String,
    },

    #[error("network '{name}' has port 0")]
    ZeroPort { name: String },

    #[error("confirmation.max_rounds must be greater than 0")]
    ZeroRoundBudget,

    #[error("node.request_timeout_secs must be greater than 0")]
    ZeroTimeout,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &Web3Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.networks.is_empty() {
        errors.push(ValidationError::NoNetworks);
    }

    let mut seen = HashSet::new();
    for (index, network) in config.networks.iter().enumerate() {
        if network.name.trim().is_empty() {
            errors.push(ValidationError::EmptyName { index });
        } else if !seen.insert(network.name.as_str()) {
            errors.push(ValidationError::DuplicateName {
                name: network.name.clone(),
            });
        }

        let invalid_url = |reason: String| ValidationError::InvalidUrl {
            name: network.name.clone(),
            url: network.url.clone(),
            reason,
        };
        match Url::parse(&network.url) {
            Ok(url) if !matches!(url.scheme(), "http" | "https") => {
                errors.push(invalid_url(format!("unsupported scheme '{}'", url.scheme())))
            }
            Ok(_) => {}
            Err(e) => errors.push(invalid_url(e.to_string())),
        }

        if network.port == Some(0) {
            errors.push(ValidationError::ZeroPort {
                name: network.name.clone(),
            });
        }
    }

    if config.confirmation.max_rounds == 0 {
        errors.push(ValidationError::ZeroRoundBudget);
    }
    if config.node.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
