//! The external signer contract.

use async_trait::async_trait;

use crate::events::{Callback, ObserverId};
use crate::wallet::types::{SignedPayload, SigningRequest, WalletEvent, WalletResult};

/// An external signer reached through an out-of-band session.
///
/// One implementation per transport. Implementations notify subscribers of
/// `connect`, `disconnect` and `session_update` in the order they happen.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Begin session negotiation. May never complete if the user walks away;
    /// no timeout is applied here.
    async fn connect(&self) -> WalletResult<()>;

    /// Tear the session down. A no-op when already disconnected.
    async fn disconnect(&self) -> WalletResult<()>;

    fn is_connected(&self) -> bool;

    /// Active account address. Fails with `WalletError::NotConnected` when no
    /// session exists; never returns an empty placeholder.
    fn account(&self) -> WalletResult<String>;

    /// Sign exactly one ordered group. The reply has the same length and
    /// order as `group`; `None` marks a member the signer did not sign.
    async fn sign_transactions(&self, group: &[SigningRequest]) -> WalletResult<Vec<SignedPayload>>;

    fn subscribe(&self, callback: Callback<WalletEvent>) -> ObserverId;

    fn unsubscribe(&self, id: ObserverId) -> bool;
}
