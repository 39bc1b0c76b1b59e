//! Node REST client with timeout and error handling.
//!
//! # Responsibilities
//! - Bind to one network's endpoint, port and access token
//! - Map the `NodeApi` operations onto the algod v2 REST routes
//! - Turn non-success responses into `NodeError::Status` with the node's message
//! - Record per-endpoint metrics

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::schema::NodeConfig;
use crate::network::Network;
use crate::node::api::NodeApi;
use crate::node::types::{
    AccountInformation, ErrorBody, NodeError, NodeResult, NodeStatus, PendingTransactionInfo,
    SubmitResponse, TransactionParams,
};
use crate::observability::metrics;

/// Header carrying the node access token.
pub const TOKEN_HEADER: &str = "X-Algo-API-Token";

/// algod v2 REST client.
#[derive(Clone)]
pub struct AlgodClient {
    http: reqwest::Client,
    base_url: Url,
    network_name: String,
}

impl AlgodClient {
    /// Create a client for a network. Performs no I/O.
    pub fn new(network: &Network, config: &NodeConfig) -> NodeResult<Self> {
        let base_url = Self::base_url(network)?;

        let mut headers = HeaderMap::new();
        if let Some(token) = network.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(token).map_err(|e| NodeError::InvalidEndpoint {
                url: network.url.clone(),
                reason: format!("invalid token header: {}", e),
            })?;
            value.set_sensitive(true);
            headers.insert(TOKEN_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| NodeError::InvalidEndpoint {
                url: network.url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url,
            network_name: network.name.clone(),
        })
    }

    /// Resolve the effective base URL, applying the port override.
    pub fn base_url(network: &Network) -> NodeResult<Url> {
        let invalid = |reason: String| NodeError::InvalidEndpoint {
            url: network.url.clone(),
            reason,
        };

        let mut url: Url = network.url.parse().map_err(|e| invalid(format!("{}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if let Some(port) = network.port {
            url.set_port(Some(port))
                .map_err(|_| invalid("URL cannot carry a port".to_string()))?;
        }
        Ok(url)
    }

    /// The URL this client talks to.
    pub fn url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL. Each segment is
    /// percent-encoded, so caller input cannot change the route.
    fn endpoint(&self, segments: &[&str]) -> NodeResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NodeError::InvalidEndpoint {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        segments: &[&str],
    ) -> NodeResult<T> {
        let start = Instant::now();
        let result: NodeResult<T> = async {
            let response = self.http.get(self.endpoint(segments)?).send().await?;
            Self::decode(response).await
        }
        .await;
        self.finish(endpoint, start, result)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> NodeResult<T> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned());
            return Err(NodeError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|e| NodeError::Decode(e.to_string()))
    }

    fn finish<T>(&self, endpoint: &'static str, start: Instant, result: NodeResult<T>) -> NodeResult<T> {
        metrics::record_node_request(endpoint, result.is_ok(), start);
        if let Err(e) = &result {
            tracing::warn!(network = %self.network_name, endpoint, error = %e, "Node request failed");
        }
        result
    }
}

#[async_trait]
impl NodeApi for AlgodClient {
    async fn account_information(&self, address: &str) -> NodeResult<AccountInformation> {
        self.get_json("account_information", &["v2", "accounts", address])
            .await
    }

    async fn transaction_params(&self) -> NodeResult<TransactionParams> {
        self.get_json("transaction_params", &["v2", "transactions", "params"]).await
    }

    async fn send_raw_transactions(&self, signed: &[Vec<u8>]) -> NodeResult<String> {
        let start = Instant::now();
        let body: Vec<u8> = signed.concat();
        let result: NodeResult<String> = async {
            let response = self
                .http
                .post(self.endpoint(&["v2", "transactions"])?)
                .header(CONTENT_TYPE, "application/x-binary")
                .body(body)
                .send()
                .await?;
            let submitted: SubmitResponse = Self::decode(response).await?;
            Ok(submitted.tx_id)
        }
        .await;
        self.finish("send_raw_transactions", start, result)
    }

    async fn status(&self) -> NodeResult<NodeStatus> {
        self.get_json("status", &["v2", "status"]).await
    }

    async fn pending_transaction_information(
        &self,
        tx_id: &str,
    ) -> NodeResult<PendingTransactionInfo> {
        self.get_json(
            "pending_transaction_information",
            &["v2", "transactions", "pending", tx_id],
        )
        .await
    }

    async fn status_after_block(&self, round: u64) -> NodeResult<NodeStatus> {
        let round = round.to_string();
        self.get_json(
            "status_after_block",
            &["v2", "status", "wait-for-block-after", round.as_str()],
        )
        .await
    }
}

impl std::fmt::Debug for AlgodClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgodClient")
            .field("network", &self.network_name)
            .field("url", &self.base_url.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_port_override() {
        let network = Network::new("LocalNet", "http://localhost").with_port(4001);
        let url = AlgodClient::base_url(&network).unwrap();
        assert_eq!(url.as_str(), "http://localhost:4001/");
    }

    #[test]
    fn test_endpoint_keeps_path_prefix() {
        let network = Network::new("Proxy", "https://node.example.com/algod/");
        let client = AlgodClient::new(&network, &NodeConfig::default()).unwrap();
        let url = client.endpoint(&["v2", "status"]).unwrap();
        assert_eq!(url.as_str(), "https://node.example.com/algod/v2/status");

        let network = Network::new("LocalNet", "http://localhost").with_port(4001);
        let client = AlgodClient::new(&network, &NodeConfig::default()).unwrap();
        let url = client.endpoint(&["v2", "status"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:4001/v2/status");
    }

    #[test]
    fn test_endpoint_escapes_caller_input() {
        let network = Network::new("LocalNet", "http://localhost");
        let client = AlgodClient::new(&network, &NodeConfig::default()).unwrap();
        let url = client
            .endpoint(&["v2", "accounts", "../status?x=1#frag"])
            .unwrap();
        assert_eq!(url.path(), "/v2/accounts/..%2Fstatus%3Fx=1%23frag");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_invalid_endpoint() {
        let network = Network::new("Bad", "not a url");
        let err = AlgodClient::new(&network, &NodeConfig::default()).unwrap_err();
        assert!(matches!(err, NodeError::InvalidEndpoint { .. }));

        let network = Network::new("Ftp", "ftp://node.example.com");
        let err = AlgodClient::new(&network, &NodeConfig::default()).unwrap_err();
        assert!(err.to_string().contains("unsupported scheme"));
    }

    #[test]
    fn test_debug_hides_token() {
        let network = Network::new("LocalNet", "http://localhost").with_token("secret-token");
        let client = AlgodClient::new(&network, &NodeConfig::default()).unwrap();
        assert!(!format!("{:?}", client).contains("secret-token"));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_http_error() {
        let network = Network::new("Down", "http://127.0.0.1:1");
        let config = NodeConfig {
            request_timeout_secs: 2,
            ..NodeConfig::default()
        };
        let client = AlgodClient::new(&network, &config).unwrap();
        let err = client.status().await.unwrap_err();
        assert!(matches!(err, NodeError::Http(_)));
    }
}
