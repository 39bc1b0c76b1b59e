//! WalletConnect-style adapter.
//!
//! # Responsibilities
//! - Drive session create/kill through an opaque `Bridge`
//! - Frame signing requests as JSON-RPC `algo_signTxn`
//! - Re-publish bridge lifecycle events to subscribers, in arrival order
//!
//! The bridge protocol itself (relay server, QR handshake, encryption) lives
//! behind `Bridge` and is not implemented here.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::events::{Callback, ObserverId, Observers};
use crate::wallet::adapter::WalletAdapter;
use crate::wallet::types::{
    SignedPayload, SigningRequest, WalletError, WalletEvent, WalletEventName, WalletResult,
};

/// JSON-RPC method understood by Algorand wallets.
pub const SIGN_TXN_METHOD: &str = "algo_signTxn";

/// JSON-RPC request carried over the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub id: u64,
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    pub fn new(method: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            id: payload_id(),
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Millisecond timestamp times 1000 plus three random digits.
pub fn payload_id() -> u64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u64::try_from(d.as_millis()).ok())
        .unwrap_or_default();
    millis.saturating_mul(1000) + rand::thread_rng().gen_range(0..1000)
}

/// The bridged session the adapter drives.
#[async_trait]
pub trait Bridge: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Accounts exposed by the session, primary first.
    fn accounts(&self) -> Vec<String>;

    /// Start a new session handshake.
    async fn create_session(&self) -> WalletResult<()>;

    async fn kill_session(&self) -> WalletResult<()>;

    /// Send a request and wait for the peer's `result`.
    async fn send_custom_request(&self, request: JsonRpcRequest)
        -> WalletResult<serde_json::Value>;
}

/// `WalletAdapter` over a WalletConnect-style bridge.
pub struct WalletConnectAdapter<B: Bridge> {
    bridge: B,
    observers: Observers<WalletEvent>,
}

impl<B: Bridge> WalletConnectAdapter<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            observers: Observers::new(),
        }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    /// Entry point for the bridge glue to report a lifecycle event.
    pub fn handle_session_event(
        &self,
        name: WalletEventName,
        error: Option<String>,
        payload: serde_json::Value,
    ) {
        match &error {
            Some(e) => tracing::warn!(event = %name, error = %e, "Wallet session event"),
            None => tracing::info!(event = %name, "Wallet session event"),
        }
        self.observers.emit(&WalletEvent {
            name,
            error,
            payload,
        });
    }

    /// Build the JSON-RPC request for one group.
    pub fn sign_request(group: &[SigningRequest]) -> WalletResult<JsonRpcRequest> {
        let group = serde_json::to_value(group)
            .map_err(|e| WalletError::MalformedResponse(format!("cannot encode request: {}", e)))?;
        Ok(JsonRpcRequest::new(
            SIGN_TXN_METHOD,
            serde_json::Value::Array(vec![group]),
        ))
    }
}

#[async_trait]
impl<B: Bridge> WalletAdapter for WalletConnectAdapter<B> {
    async fn connect(&self) -> WalletResult<()> {
        if self.bridge.is_connected() {
            return Ok(());
        }
        tracing::debug!("Creating wallet session");
        self.bridge.create_session().await
    }

    async fn disconnect(&self) -> WalletResult<()> {
        if !self.bridge.is_connected() {
            return Ok(());
        }
        tracing::debug!("Killing wallet session");
        self.bridge.kill_session().await
    }

    fn is_connected(&self) -> bool {
        self.bridge.is_connected()
    }

    fn account(&self) -> WalletResult<String> {
        if !self.bridge.is_connected() {
            return Err(WalletError::NotConnected);
        }
        self.bridge
            .accounts()
            .into_iter()
            .find(|a| !a.is_empty())
            .ok_or(WalletError::NotConnected)
    }

    async fn sign_transactions(&self, group: &[SigningRequest]) -> WalletResult<Vec<SignedPayload>> {
        if !self.bridge.is_connected() {
            return Err(WalletError::NotConnected);
        }
        let request = Self::sign_request(group)?;
        tracing::debug!(request_id = request.id, members = group.len(), "Requesting signatures");

        let response = self.bridge.send_custom_request(request).await?;
        serde_json::from_value(response).map_err(|e| WalletError::MalformedResponse(e.to_string()))
    }

    fn subscribe(&self, callback: Callback<WalletEvent>) -> ObserverId {
        self.observers.subscribe(callback)
    }

    fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }
}

impl<B: Bridge> std::fmt::Debug for WalletConnectAdapter<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConnectAdapter")
            .field("connected", &self.bridge.is_connected())
            .field("observers", &self.observers)
            .finish()
    }
}
