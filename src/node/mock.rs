//! In-memory node with scripted responses, used by tests and demos.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::node::api::NodeApi;
use crate::node::types::{
    AccountInformation, NodeError, NodeResult, NodeStatus, PendingTransactionInfo,
    TransactionParams,
};

/// Number of calls made to each operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub account_information: usize,
    pub transaction_params: usize,
    pub send_raw_transactions: usize,
    pub status: usize,
    pub pending_transaction_information: usize,
    pub status_after_block: usize,
}

#[derive(Debug, Default)]
struct MockState {
    last_round: Option<u64>,
    accounts: HashMap<String, AccountInformation>,
    params: Option<TransactionParams>,
    /// Consumed front to back; the last entry repeats.
    pending: VecDeque<PendingTransactionInfo>,
    submit_result: Option<Result<String, String>>,
    submitted: Vec<Vec<Vec<u8>>>,
    waited_rounds: Vec<u64>,
    calls: CallCounts,
}

/// Scripted `NodeApi` implementation.
#[derive(Clone, Default)]
pub struct MockNode {
    state: Arc<Mutex<MockState>>,
}

impl MockNode {
    pub fn new() -> Self {
        let node = Self::default();
        node.with_state(|s| s.last_round = Some(1));
        node
    }

    /// Set the round `status()` reports. `None` simulates a node without a
    /// usable status.
    pub fn set_last_round(&self, round: Option<u64>) {
        self.with_state(|s| s.last_round = round);
    }

    pub fn insert_account(&self, info: AccountInformation) {
        self.with_state(|s| {
            s.accounts.insert(info.address.clone(), info);
        });
    }

    pub fn set_params(&self, params: TransactionParams) {
        self.with_state(|s| s.params = Some(params));
    }

    /// Queue poll responses. The final one keeps being returned.
    pub fn push_pending(&self, info: PendingTransactionInfo) {
        self.with_state(|s| s.pending.push_back(info));
    }

    pub fn set_submit_result(&self, result: Result<String, String>) {
        self.with_state(|s| s.submit_result = Some(result));
    }

    /// Every batch passed to `send_raw_transactions`.
    pub fn submitted(&self) -> Vec<Vec<Vec<u8>>> {
        self.with_state(|s| s.submitted.clone())
    }

    /// Rounds passed to `status_after_block`, in call order.
    pub fn waited_rounds(&self) -> Vec<u64> {
        self.with_state(|s| s.waited_rounds.clone())
    }

    pub fn calls(&self) -> CallCounts {
        self.with_state(|s| s.calls.clone())
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        let mut lock = self.state.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut lock)
    }
}

#[async_trait]
impl NodeApi for MockNode {
    async fn account_information(&self, address: &str) -> NodeResult<AccountInformation> {
        self.with_state(|s| {
            s.calls.account_information += 1;
            s.accounts.get(address).cloned().ok_or_else(|| NodeError::Status {
                status: 404,
                message: format!("account {} not found", address),
            })
        })
    }

    async fn transaction_params(&self) -> NodeResult<TransactionParams> {
        self.with_state(|s| {
            s.calls.transaction_params += 1;
            s.params.clone().ok_or_else(|| NodeError::Status {
                status: 503,
                message: "params not scripted".to_string(),
            })
        })
    }

    async fn send_raw_transactions(&self, signed: &[Vec<u8>]) -> NodeResult<String> {
        self.with_state(|s| {
            s.calls.send_raw_transactions += 1;
            s.submitted.push(signed.to_vec());
            match s.submit_result.clone() {
                Some(Ok(tx_id)) => Ok(tx_id),
                Some(Err(message)) => Err(NodeError::Status {
                    status: 400,
                    message,
                }),
                None => Ok("MOCKTXID".to_string()),
            }
        })
    }

    async fn status(&self) -> NodeResult<NodeStatus> {
        self.with_state(|s| {
            s.calls.status += 1;
            Ok(NodeStatus {
                last_round: s.last_round,
                ..NodeStatus::default()
            })
        })
    }

    async fn pending_transaction_information(
        &self,
        tx_id: &str,
    ) -> NodeResult<PendingTransactionInfo> {
        self.with_state(|s| {
            s.calls.pending_transaction_information += 1;
            let info = if s.pending.len() > 1 {
                s.pending.pop_front()
            } else {
                s.pending.front().cloned()
            };
            info.ok_or_else(|| NodeError::Status {
                status: 404,
                message: format!("transaction {} not found", tx_id),
            })
        })
    }

    async fn status_after_block(&self, round: u64) -> NodeResult<NodeStatus> {
        self.with_state(|s| {
            s.calls.status_after_block += 1;
            s.waited_rounds.push(round);
            s.last_round = Some(round + 1);
            Ok(NodeStatus {
                last_round: Some(round + 1),
                ..NodeStatus::default()
            })
        })
    }
}

impl std::fmt::Debug for MockNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockNode").field("calls", &self.calls()).finish()
    }
}
