//! External signer subsystem.
//!
//! # Data Flow
//! ```text
//! TransactionPipeline
//!     → WalletAdapter::sign_transactions(one group of SigningRequest)
//!     → WalletConnectAdapter → Bridge (opaque session) → remote signer
//!     ← Vec<Option<base64 signed txn>>
//!
//! Bridge lifecycle (connect / disconnect / session_update)
//!     → adapter observers → Web3Client observers → presentation layer
//! ```
//!
//! # Security Constraints
//! - Keys never enter this process; signing happens on the remote device

pub mod adapter;
pub mod mock;
pub mod types;
pub mod walletconnect;

pub use adapter::WalletAdapter;
pub use mock::MockWallet;
pub use types::{
    SignedPayload, SigningRequest, WalletError, WalletEvent, WalletEventName, WalletResult,
};
pub use walletconnect::{Bridge, JsonRpcRequest, WalletConnectAdapter, SIGN_TXN_METHOD};
