//! Network entries.

use serde::{Deserialize, Serialize};

/// One selectable node endpoint. Immutable once placed in a registry.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Network {
    /// Display name, e.g. "MainNet".
    pub name: String,

    /// Base URL of the node REST API.
    pub url: String,

    /// Overrides the port of `url` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Node access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Network {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            port: None,
            token: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("port", &self.port)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
