//! Node collaborator subsystem.
//!
//! # Data Flow
//! ```text
//! Network (url, port, token)
//!     → NodeConnector (builds a handle, no I/O)
//!     → Arc<dyn NodeApi> (AlgodClient over REST, or MockNode)
//!     → pipeline submission, poller status/pending/long-poll queries
//! ```

pub mod api;
pub mod client;
pub mod mock;
pub mod types;

pub use api::{NodeApi, NodeConnector};
pub use client::AlgodClient;
pub use mock::MockNode;
pub use types::{
    AccountInformation, AssetHolding, NodeError, NodeResult, NodeStatus, PendingTransactionInfo,
    SuggestedParams, TransactionParams,
};
