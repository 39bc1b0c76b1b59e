//! Signing request shapes, wallet events and errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by wallet adapters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// No session exists. Recoverable by prompting a connect.
    #[error("Wallet is not connected")]
    NotConnected,

    /// The session accepted the request but the signer refused it.
    #[error("Signing request rejected: {0}")]
    Rejected(String),

    /// The session broke down while a request was outstanding.
    #[error("Wallet session error: {0}")]
    Session(String),

    /// The signer answered with something that is not a signing result.
    #[error("Malformed wallet response: {0}")]
    MalformedResponse(String),
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

/// One group member as sent to the signer.
///
/// Serializes to `{"txn", "signers"?, "authAddr"?, "message"?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningRequest {
    /// Base64 of the canonical unsigned encoding.
    pub txn: String,

    /// Partial multisig signers. An empty list means "do not sign this one".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signers: Option<Vec<String>>,

    /// Signer to use instead of the sender (rekeyed accounts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_addr: Option<String>,

    /// Text the signer shows the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SigningRequest {
    pub fn new(txn: impl Into<String>) -> Self {
        Self {
            txn: txn.into(),
            signers: None,
            auth_addr: None,
            message: None,
        }
    }

    pub fn with_signers(mut self, signers: Vec<String>) -> Self {
        self.signers = Some(signers);
        self
    }

    pub fn with_auth_addr(mut self, auth_addr: impl Into<String>) -> Self {
        self.auth_addr = Some(auth_addr.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Signer reply for one group member: base64 signed bytes, or `None` when
/// the member was not signed.
pub type SignedPayload = Option<String>;

/// Session lifecycle events an adapter reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletEventName {
    Connect,
    Disconnect,
    SessionUpdate,
}

impl WalletEventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletEventName::Connect => "connect",
            WalletEventName::Disconnect => "disconnect",
            WalletEventName::SessionUpdate => "session_update",
        }
    }
}

impl std::str::FromStr for WalletEventName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connect" => Ok(WalletEventName::Connect),
            "disconnect" => Ok(WalletEventName::Disconnect),
            "session_update" => Ok(WalletEventName::SessionUpdate),
            other => Err(format!("unknown wallet event '{}'", other)),
        }
    }
}

impl std::fmt::Display for WalletEventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle notification with an optional error and opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletEvent {
    pub name: WalletEventName,
    pub error: Option<String>,
    pub payload: serde_json::Value,
}

impl WalletEvent {
    pub fn new(name: WalletEventName, payload: serde_json::Value) -> Self {
        Self {
            name,
            error: None,
            payload,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
