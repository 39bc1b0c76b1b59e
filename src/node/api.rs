//! The node collaborator contract.

use std::sync::Arc;

use async_trait::async_trait;

use crate::network::Network;
use crate::node::types::{
    AccountInformation, NodeResult, NodeStatus, PendingTransactionInfo, TransactionParams,
};

/// Operations the core needs from a node. One handle per active network.
#[async_trait]
pub trait NodeApi: Send + Sync {
    async fn account_information(&self, address: &str) -> NodeResult<AccountInformation>;

    async fn transaction_params(&self) -> NodeResult<TransactionParams>;

    /// Submit a whole signed group in one call. Returns the id the node
    /// reports for the batch.
    async fn send_raw_transactions(&self, signed: &[Vec<u8>]) -> NodeResult<String>;

    async fn status(&self) -> NodeResult<NodeStatus>;

    async fn pending_transaction_information(
        &self,
        tx_id: &str,
    ) -> NodeResult<PendingTransactionInfo>;

    /// Long poll: resolves once the node has seen a round after `round`.
    async fn status_after_block(&self, round: u64) -> NodeResult<NodeStatus>;
}

/// Builds node handles for networks. No network I/O happens while building.
pub trait NodeConnector: Send + Sync {
    fn connect(&self, network: &Network) -> NodeResult<Arc<dyn NodeApi>>;
}

impl<F> NodeConnector for F
where
    F: Fn(&Network) -> NodeResult<Arc<dyn NodeApi>> + Send + Sync,
{
    fn connect(&self, network: &Network) -> NodeResult<Arc<dyn NodeApi>> {
        self(network)
    }
}
