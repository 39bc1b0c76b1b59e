//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::network::Network;

/// Root configuration for the web3 client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Web3Config {
    /// Selectable networks. The first entry is active after construction.
    pub networks: Vec<Network>,

    /// Confirmation polling settings.
    pub confirmation: ConfirmationConfig,

    /// Node HTTP client settings.
    pub node: NodeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for Web3Config {
    fn default() -> Self {
        Self {
            networks: default_networks(),
            confirmation: ConfirmationConfig::default(),
            node: NodeConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Public MainNet and TestNet endpoints.
pub fn default_networks() -> Vec<Network> {
    vec![
        Network::new("MainNet", "https://mainnet-api.algonode.cloud"),
        Network::new("TestNet", "https://testnet-api.algonode.cloud"),
    ]
}

/// Which verdict wins when one poll response reports both a confirmed round
/// and a pool error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictPrecedence {
    #[default]
    RejectionFirst,
    ConfirmationFirst,
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Rounds to wait for a verdict before giving up.
    pub max_rounds: u64,

    /// Tie-break for contradictory poll responses.
    pub precedence: VerdictPrecedence,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            precedence: VerdictPrecedence::RejectionFirst,
        }
    }
}

/// Node HTTP client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Per-request timeout in seconds. Must cover one long-poll round.
    pub request_timeout_secs: u64,

    /// User-Agent header sent to the node.
    pub user_agent: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            user_agent: concat!("algo-web3/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
