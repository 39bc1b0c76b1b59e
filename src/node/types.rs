//! Node response types and error definitions.
//!
//! Field names follow the algod v2 JSON encoding (kebab-case). All integer
//! quantities are `u64`, which covers the node's full integer range; nothing
//! is decoded through a floating point type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to a node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Transport-level failure (connect, TLS, timeout, body read).
    #[error("Node request failed: {0}")]
    Http(String),

    /// The node answered with a non-success status.
    #[error("Node returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("Invalid node response: {0}")]
    Decode(String),

    /// The endpoint configuration cannot be turned into a client.
    #[error("Invalid node endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

impl From<reqwest::Error> for NodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NodeError::Decode(err.to_string())
        } else {
            NodeError::Http(err.to_string())
        }
    }
}

/// Result type for node operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// One asset balance held by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AssetHolding {
    pub asset_id: u64,
    pub amount: u64,
    #[serde(default)]
    pub is_frozen: bool,
}

/// Account state as reported by `GET /v2/accounts/{address}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccountInformation {
    pub address: String,
    /// Balance in base units.
    pub amount: u64,
    #[serde(default)]
    pub amount_without_pending_rewards: u64,
    #[serde(default)]
    pub min_balance: u64,
    #[serde(default)]
    pub pending_rewards: u64,
    #[serde(default)]
    pub rewards: u64,
    /// Round this snapshot was taken at.
    pub round: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub assets: Vec<AssetHolding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_addr: Option<String>,
}

/// Raw response of `GET /v2/transactions/params`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransactionParams {
    pub consensus_version: String,
    /// Fee per byte in base units.
    pub fee: u64,
    /// Base64 genesis hash.
    pub genesis_hash: String,
    pub genesis_id: String,
    pub last_round: u64,
    pub min_fee: u64,
}

/// Rounds a transaction built from suggested params stays valid for.
pub const DEFAULT_VALIDITY_WINDOW: u64 = 1000;

/// Parameters a new transaction is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedParams {
    /// Fee per byte, or the absolute fee when `flat_fee` is set.
    pub fee: u64,
    pub min_fee: u64,
    pub flat_fee: bool,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    /// Base64 genesis hash.
    pub genesis_hash: String,
}

impl From<TransactionParams> for SuggestedParams {
    fn from(params: TransactionParams) -> Self {
        Self {
            fee: params.fee,
            min_fee: params.min_fee,
            flat_fee: false,
            first_valid: params.last_round,
            last_valid: params.last_round.saturating_add(DEFAULT_VALIDITY_WINDOW),
            genesis_id: params.genesis_id,
            genesis_hash: params.genesis_hash,
        }
    }
}

/// Response of `GET /v2/status` and the long-poll status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeStatus {
    /// Latest round the node knows about. Absent means the node gave no
    /// usable answer.
    #[serde(default)]
    pub last_round: Option<u64>,
    #[serde(default)]
    pub last_version: Option<String>,
    /// Nanoseconds since the last round was reached.
    #[serde(default)]
    pub time_since_last_round: Option<u64>,
    #[serde(default)]
    pub catchup_time: Option<u64>,
}

/// Response of `POST /v2/transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(rename = "txId")]
    pub tx_id: String,
}

/// Per-poll view of a submitted transaction.
///
/// No `confirmed_round` and an empty `pool_error` means "still pending".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingTransactionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed_round: Option<u64>,
    #[serde(default)]
    pub pool_error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_index: Option<u64>,
    /// The node's view of the transaction, kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txn: Option<serde_json::Value>,
}

impl PendingTransactionInfo {
    /// Included in a round.
    pub fn is_confirmed(&self) -> bool {
        matches!(self.confirmed_round, Some(round) if round > 0)
    }

    /// Dropped from the pool with a reason.
    pub fn is_rejected(&self) -> bool {
        !self.pool_error.is_empty()
    }

    pub fn confirmed(round: u64) -> Self {
        Self {
            confirmed_round: Some(round),
            ..Self::default()
        }
    }

    pub fn rejected(pool_error: impl Into<String>) -> Self {
        Self {
            pool_error: pool_error.into(),
            ..Self::default()
        }
    }

    pub fn pending() -> Self {
        Self::default()
    }
}

/// Error body returned by algod on failures.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}
