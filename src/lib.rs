//! Algorand web3 client core.
//!
//! Connects an external signing wallet to a node, groups and submits
//! transactions, and waits for them to be confirmed.
//!
//! ```text
//! Web3Client::send_transactions(txns)
//!     → TransactionPipeline: group → prepare → sign (WalletAdapter) → submit (NodeApi)
//!     → ConfirmationPoller: status → pending info / long poll per round
//!     ← PendingTransactionInfo | Web3Error
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod network;
pub mod node;
pub mod observability;
pub mod transaction;
pub mod wallet;

pub use client::{ClientEvent, Web3Client};
pub use config::schema::Web3Config;
pub use error::{Web3Error, Web3Result};
pub use events::{Callback, ObserverId, Observers};
pub use network::Network;
pub use node::{NodeApi, PendingTransactionInfo};
pub use transaction::{RawTransaction, TransactionPipeline};
pub use wallet::{WalletAdapter, WalletEvent};
