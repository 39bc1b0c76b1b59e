//! Scripted wallet used by tests and demos.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::events::{Callback, ObserverId, Observers};
use crate::wallet::adapter::WalletAdapter;
use crate::wallet::types::{
    SignedPayload, SigningRequest, WalletError, WalletEvent, WalletEventName, WalletResult,
};

#[derive(Debug, Default)]
struct MockWalletState {
    account: Option<String>,
    replies: VecDeque<WalletResult<Vec<SignedPayload>>>,
    received: Vec<Vec<SigningRequest>>,
}

/// `WalletAdapter` with scripted session state and signing replies.
///
/// Without a scripted reply, every member is "signed" by echoing its
/// request bytes back, which keeps the output deterministic.
#[derive(Clone, Default)]
pub struct MockWallet {
    state: Arc<Mutex<MockWalletState>>,
    observers: Arc<Observers<WalletEvent>>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A wallet that already has a session for `account`.
    pub fn connected(account: impl Into<String>) -> Self {
        let wallet = Self::new();
        wallet.with_state(|s| s.account = Some(account.into()));
        wallet
    }

    pub fn push_reply(&self, reply: WalletResult<Vec<SignedPayload>>) {
        self.with_state(|s| s.replies.push_back(reply));
    }

    /// Groups passed to `sign_transactions`, one entry per call.
    pub fn received(&self) -> Vec<Vec<SigningRequest>> {
        self.with_state(|s| s.received.clone())
    }

    /// Simulate the remote side announcing a lifecycle event.
    pub fn emit(&self, event: WalletEvent) {
        self.observers.emit(&event);
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockWalletState) -> R) -> R {
        let mut lock = self.state.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut lock)
    }
}

#[async_trait]
impl WalletAdapter for MockWallet {
    async fn connect(&self) -> WalletResult<()> {
        let newly = self.with_state(|s| {
            let newly = s.account.is_none();
            if newly {
                s.account = Some("MOCKACCOUNT".to_string());
            }
            newly
        });
        if newly {
            self.observers.emit(&WalletEvent::new(
                WalletEventName::Connect,
                serde_json::json!({"accounts": ["MOCKACCOUNT"]}),
            ));
        }
        Ok(())
    }

    async fn disconnect(&self) -> WalletResult<()> {
        let was = self.with_state(|s| s.account.take().is_some());
        if was {
            self.observers.emit(&WalletEvent::new(
                WalletEventName::Disconnect,
                serde_json::Value::Null,
            ));
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.with_state(|s| s.account.is_some())
    }

    fn account(&self) -> WalletResult<String> {
        self.with_state(|s| s.account.clone()).ok_or(WalletError::NotConnected)
    }

    async fn sign_transactions(&self, group: &[SigningRequest]) -> WalletResult<Vec<SignedPayload>> {
        self.with_state(|s| {
            if s.account.is_none() {
                return Err(WalletError::NotConnected);
            }
            s.received.push(group.to_vec());
            match s.replies.pop_front() {
                Some(reply) => reply,
                None => Ok(group.iter().map(|r| Some(r.txn.clone())).collect()),
            }
        })
    }

    fn subscribe(&self, callback: Callback<WalletEvent>) -> ObserverId {
        self.observers.subscribe(callback)
    }

    fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }
}

impl std::fmt::Debug for MockWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockWallet")
            .field("connected", &self.is_connected())
            .finish()
    }
}
