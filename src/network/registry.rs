//! Active network selection.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::error::{Web3Error, Web3Result};
use crate::events::{Callback, ObserverId, Observers};
use crate::network::types::Network;
use crate::node::api::{NodeApi, NodeConnector};
use crate::observability::metrics;

/// Notification that the active network changed. Carries no payload;
/// subscribers re-read the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkChanged;

/// The selected network together with the node handle bound to it.
#[derive(Clone)]
pub struct ActiveNetwork {
    pub index: usize,
    pub network: Network,
    pub node: Arc<dyn NodeApi>,
}

impl std::fmt::Debug for ActiveNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveNetwork")
            .field("index", &self.index)
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}

/// Ordered, non-empty list of networks plus the active selection.
pub struct NetworkRegistry {
    networks: Vec<Network>,
    active: ArcSwap<ActiveNetwork>,
    connector: Arc<dyn NodeConnector>,
    observers: Observers<NetworkChanged>,
}

impl NetworkRegistry {
    /// Build a registry with the first network active.
    ///
    /// # Panics
    /// An empty `networks` list is a programming error. Config validation
    /// rejects it before this point.
    pub fn new(networks: Vec<Network>, connector: Arc<dyn NodeConnector>) -> Web3Result<Self> {
        assert!(!networks.is_empty(), "network list must not be empty");

        let node = connector.connect(&networks[0])?;
        let active = ActiveNetwork {
            index: 0,
            network: networks[0].clone(),
            node,
        };
        tracing::debug!(network = %active.network.name, "Network registry initialized");

        Ok(Self {
            networks,
            active: ArcSwap::from_pointee(active),
            connector,
            observers: Observers::new(),
        })
    }

    /// Select the network at `index` and rebind the node handle.
    ///
    /// No request is sent to the new node here. On any error the previous
    /// selection stays active and no notification fires. Operations that
    /// already captured the old handle keep using it.
    pub fn switch_network(&self, index: usize) -> Web3Result<()> {
        let network = self
            .networks
            .get(index)
            .ok_or(Web3Error::IndexOutOfRange {
                index,
                len: self.networks.len(),
            })?;

        let node = self.connector.connect(network)?;
        let previous = self.active.swap(Arc::new(ActiveNetwork {
            index,
            network: network.clone(),
            node,
        }));

        tracing::info!(
            from = %previous.network.name,
            to = %network.name,
            index = index,
            "Switched network"
        );
        metrics::record_network_switch(&network.name);

        self.observers.emit(&NetworkChanged);
        Ok(())
    }

    /// Snapshot of the current selection.
    pub fn active(&self) -> Arc<ActiveNetwork> {
        self.active.load_full()
    }

    pub fn current_index(&self) -> usize {
        self.active.load().index
    }

    pub fn current_network(&self) -> Network {
        self.active.load().network.clone()
    }

    /// Node handle of the active network.
    pub fn node(&self) -> Arc<dyn NodeApi> {
        self.active.load().node.clone()
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn subscribe(&self, callback: Callback<NetworkChanged>) -> ObserverId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }
}

impl std::fmt::Debug for NetworkRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkRegistry")
            .field("networks", &self.networks)
            .field("current_index", &self.current_index())
            .field("observers", &self.observers)
            .finish()
    }
}
