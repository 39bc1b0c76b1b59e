//! The client facade.
//!
//! `Web3Client` owns the network registry and an optional wallet adapter,
//! builds a pipeline and poller per send, and re-publishes network and
//! wallet notifications on its own observer list.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::loader::ConfigError;
use crate::config::schema::{ConfirmationConfig, Web3Config};
use crate::config::validation::validate_config;
use crate::error::{Web3Error, Web3Result};
use crate::events::{Callback, ObserverId, Observers};
use crate::network::{Network, NetworkChanged, NetworkRegistry};
use crate::node::api::{NodeApi, NodeConnector};
use crate::node::client::AlgodClient;
use crate::node::types::{AccountInformation, NodeResult, PendingTransactionInfo, SuggestedParams};
use crate::transaction::confirmation::ConfirmationPoller;
use crate::transaction::encoding::RawTransaction;
use crate::transaction::pipeline::TransactionPipeline;
use crate::wallet::adapter::WalletAdapter;
use crate::wallet::types::{SigningRequest, WalletEvent};

/// Notifications delivered to client subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The active network changed; re-read `current_network`.
    NetworkChanged,
    /// Forwarded wallet lifecycle event.
    Wallet(WalletEvent),
}

pub struct Web3Client {
    registry: NetworkRegistry,
    wallet: Option<Arc<dyn WalletAdapter>>,
    confirmation: ConfirmationConfig,
    observers: Arc<Observers<ClientEvent>>,
    wallet_forwarder: Option<ObserverId>,
}

impl Web3Client {
    /// Build a client whose node handles talk to algod over HTTP.
    pub fn new(config: &Web3Config, wallet: Option<Arc<dyn WalletAdapter>>) -> Web3Result<Self> {
        let node_config = config.node.clone();
        let connector = move |network: &Network| -> NodeResult<Arc<dyn NodeApi>> {
            Ok(Arc::new(AlgodClient::new(network, &node_config)?))
        };
        Self::with_connector(config, wallet, Arc::new(connector))
    }

    /// Build a client with a custom node connector.
    pub fn with_connector(
        config: &Web3Config,
        wallet: Option<Arc<dyn WalletAdapter>>,
        connector: Arc<dyn NodeConnector>,
    ) -> Web3Result<Self> {
        validate_config(config).map_err(ConfigError::Validation)?;

        let registry = NetworkRegistry::new(config.networks.clone(), connector)?;
        let observers: Arc<Observers<ClientEvent>> = Arc::new(Observers::new());

        let forward = Arc::downgrade(&observers);
        registry.subscribe(Arc::new(move |_: &NetworkChanged| {
            if let Some(observers) = forward.upgrade() {
                observers.emit(&ClientEvent::NetworkChanged);
            }
        }));

        let wallet_forwarder = wallet.as_ref().map(|wallet| {
            let forward = Arc::downgrade(&observers);
            wallet.subscribe(Arc::new(move |event: &WalletEvent| {
                if let Some(observers) = forward.upgrade() {
                    observers.emit(&ClientEvent::Wallet(event.clone()));
                }
            }))
        });

        tracing::info!(
            networks = config.networks.len(),
            active = %registry.current_network().name,
            wallet = wallet.is_some(),
            "Client initialized"
        );

        Ok(Self {
            registry,
            wallet,
            confirmation: config.confirmation.clone(),
            observers,
            wallet_forwarder,
        })
    }

    /// Select another network. See `NetworkRegistry::switch_network`.
    ///
    /// Do not switch while a send is outstanding: the send keeps polling the
    /// node it started on.
    pub fn switch_network(&self, index: usize) -> Web3Result<()> {
        self.registry.switch_network(index)
    }

    pub fn current_index(&self) -> usize {
        self.registry.current_index()
    }

    pub fn current_network(&self) -> Network {
        self.registry.current_network()
    }

    pub fn networks(&self) -> &[Network] {
        self.registry.networks()
    }

    /// Node handle of the active network.
    pub fn node(&self) -> Arc<dyn NodeApi> {
        self.registry.node()
    }

    pub fn wallet(&self) -> Option<&Arc<dyn WalletAdapter>> {
        self.wallet.as_ref()
    }

    /// Account information for `address`, or for the connected wallet's
    /// account when `address` is `None`.
    pub async fn fetch_account_info(&self, address: Option<&str>) -> Web3Result<AccountInformation> {
        let address = match address {
            Some(address) => address.to_string(),
            None => self.wallet_account().ok_or(Web3Error::NoAccount)?,
        };
        Ok(self.node().account_information(&address).await?)
    }

    /// Suggested parameters for building transactions on the active network.
    pub async fn suggested_params(&self) -> Web3Result<SuggestedParams> {
        Ok(self.node().transaction_params().await?.into())
    }

    /// Group, sign, submit and wait for a verdict.
    pub async fn send_transactions(
        &self,
        txns: Vec<RawTransaction>,
    ) -> Web3Result<PendingTransactionInfo> {
        self.send_transactions_with(txns, |_, _| {}).await
    }

    /// Like `send_transactions`, with a hook that can fill per-member
    /// signing overrides before the wallet is asked.
    pub async fn send_transactions_with<F>(
        &self,
        txns: Vec<RawTransaction>,
        customize: F,
    ) -> Web3Result<PendingTransactionInfo>
    where
        F: FnMut(usize, &mut SigningRequest) + Send,
    {
        let wallet = self.wallet.clone().ok_or(Web3Error::NotConnected)?;
        // Captured once: the whole send uses this network's node.
        let node = self.node();

        let submission = TransactionPipeline::new(node.clone(), wallet)
            .run(txns, customize)
            .await?;

        ConfirmationPoller::new(node, &self.confirmation)
            .await_confirmation(&submission.tx_id)
            .await
    }

    /// Poll an already submitted transaction, e.g. after a timeout.
    pub async fn wait_for_confirmation(
        &self,
        tx_id: &str,
        max_rounds: Option<u64>,
    ) -> Web3Result<PendingTransactionInfo> {
        let poller = ConfirmationPoller::new(self.node(), &self.confirmation);
        let max_rounds = max_rounds.unwrap_or(poller.max_rounds());
        poller.await_within(tx_id, max_rounds).await
    }

    pub fn subscribe(&self, callback: Callback<ClientEvent>) -> ObserverId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Receive client events on a channel. Dropping the receiver
    /// unsubscribes on the next event.
    pub fn subscribe_channel(&self) -> (ObserverId, mpsc::UnboundedReceiver<ClientEvent>) {
        self.observers.subscribe_channel()
    }

    fn wallet_account(&self) -> Option<String> {
        let wallet = self.wallet.as_ref()?;
        if !wallet.is_connected() {
            return None;
        }
        wallet.account().ok()
    }
}

impl Drop for Web3Client {
    fn drop(&mut self) {
        if let (Some(wallet), Some(id)) = (&self.wallet, self.wallet_forwarder) {
            wallet.unsubscribe(id);
        }
    }
}

impl std::fmt::Debug for Web3Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Web3Client")
            .field("registry", &self.registry)
            .field("wallet", &self.wallet.as_ref().map(|w| w.is_connected()))
            .field("confirmation", &self.confirmation)
            .finish()
    }
}
