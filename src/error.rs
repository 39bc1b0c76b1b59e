//! Error types surfaced by the client.

use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::node::types::NodeError;
use crate::transaction::encoding::EncodingError;
use crate::wallet::types::WalletError;

/// Every failure a client operation can end in. Stage failures abort the
/// rest of the operation; nothing is retried internally.
#[derive(Debug, Error)]
pub enum Web3Error {
    /// No wallet session. Recoverable by prompting a connect.
    #[error("Wallet is not connected")]
    NotConnected,

    /// Neither an explicit address nor a connected wallet.
    #[error("No account address available")]
    NoAccount,

    /// Bad network selection.
    #[error("Network index {index} out of range ({len} networks configured)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Cannot send an empty transaction group")]
    EmptyGroup,

    /// The signer broke the same-length contract.
    #[error("Wallet returned {actual} results for a group of {expected}")]
    SignatureCountMismatch { expected: usize, actual: usize },

    /// The signer left a member unsigned. Nothing was submitted.
    #[error("Signature missing for group member {index}")]
    MissingSignature { index: usize },

    #[error("Signature for group member {index} is not valid base64: {reason}")]
    InvalidSignature { index: usize, reason: String },

    /// The node's pool refused the transaction.
    #[error("Transaction {tx_id} rejected by node: {pool_error}")]
    TransactionRejected { tx_id: String, pool_error: String },

    /// No verdict within the round budget. The transaction may still land.
    #[error("Transaction {tx_id} not confirmed after {rounds} rounds")]
    ConfirmationTimeout { tx_id: String, rounds: u64 },

    /// The node gave no usable status.
    #[error("Node unavailable: {0}")]
    NodeUnavailable(String),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error("Wallet error: {0}")]
    Wallet(WalletError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<WalletError> for Web3Error {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::NotConnected => Web3Error::NotConnected,
            other => Web3Error::Wallet(other),
        }
    }
}

/// Result type for client operations.
pub type Web3Result<T> = Result<T, Web3Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_connected_is_not_wrapped() {
        let err: Web3Error = WalletError::NotConnected.into();
        assert!(matches!(err, Web3Error::NotConnected));

        let err: Web3Error = WalletError::Rejected("user declined".to_string()).into();
        assert!(matches!(err, Web3Error::Wallet(_)));
        assert!(err.to_string().contains("user declined"));
    }

    #[test]
    fn test_error_display() {
        let err = Web3Error::ConfirmationTimeout {
            tx_id: "TXID".to_string(),
            rounds: 10,
        };
        assert_eq!(err.to_string(), "Transaction TXID not confirmed after 10 rounds");

        let err = Web3Error::IndexOutOfRange { index: 5, len: 2 };
        assert!(err.to_string().contains("5"));
    }
}
