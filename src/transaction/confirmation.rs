//! Round-bounded confirmation polling.
//!
//! # Algorithm
//! ```text
//! R0 = status().last_round            (absent → NodeUnavailable)
//! window = [R0 + 1, R0 + 1 + max_rounds)
//! for round in window:
//!     info = pending_transaction_information(tx_id)
//!     confirmed_round > 0     → Confirmed
//!     pool_error non-empty    → Rejected
//!     status_after_block(round)          (the only suspension point)
//! → ConfirmationTimeout
//! ```
//!
//! One node call is outstanding at a time. There is no sleep or backoff of
//! our own; pacing comes from the node's long poll.

use std::sync::Arc;

use crate::config::schema::{ConfirmationConfig, VerdictPrecedence};
use crate::error::{Web3Error, Web3Result};
use crate::node::api::NodeApi;
use crate::node::types::PendingTransactionInfo;
use crate::observability::metrics;

/// What one poll response says about the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Confirmed,
    Rejected,
    Pending,
}

impl Verdict {
    /// Classify a poll response. `precedence` decides responses that report
    /// both a positive round and a pool error.
    pub fn of(info: &PendingTransactionInfo, precedence: VerdictPrecedence) -> Self {
        match precedence {
            VerdictPrecedence::RejectionFirst if info.is_rejected() => Verdict::Rejected,
            _ if info.is_confirmed() => Verdict::Confirmed,
            _ if info.is_rejected() => Verdict::Rejected,
            _ => Verdict::Pending,
        }
    }
}

/// Waits for a submitted transaction to reach a verdict.
pub struct ConfirmationPoller {
    node: Arc<dyn NodeApi>,
    max_rounds: u64,
    precedence: VerdictPrecedence,
}

impl ConfirmationPoller {
    pub fn new(node: Arc<dyn NodeApi>, config: &ConfirmationConfig) -> Self {
        Self {
            node,
            max_rounds: config.max_rounds,
            precedence: config.precedence,
        }
    }

    pub fn max_rounds(&self) -> u64 {
        self.max_rounds
    }

    /// Poll with the configured round budget.
    pub async fn await_confirmation(&self, tx_id: &str) -> Web3Result<PendingTransactionInfo> {
        self.await_within(tx_id, self.max_rounds).await
    }

    /// Poll for at most `max_rounds` rounds.
    ///
    /// A budget of 0 times out without polling. A timeout does not mean the
    /// transaction failed; it may still be confirmed later.
    pub async fn await_within(
        &self,
        tx_id: &str,
        max_rounds: u64,
    ) -> Web3Result<PendingTransactionInfo> {
        let status = self
            .node
            .status()
            .await
            .map_err(|e| Web3Error::NodeUnavailable(e.to_string()))?;
        let last_round = status.last_round.ok_or_else(|| {
            Web3Error::NodeUnavailable("status reported no last round".to_string())
        })?;

        let start = last_round.saturating_add(1);
        let end = start.saturating_add(max_rounds);
        let mut current = start;

        while current < end {
            let info = self.node.pending_transaction_information(tx_id).await?;
            let waited = current - start;

            match Verdict::of(&info, self.precedence) {
                Verdict::Confirmed => {
                    tracing::info!(
                        tx_id = %tx_id,
                        confirmed_round = info.confirmed_round.unwrap_or_default(),
                        rounds_waited = waited,
                        "Transaction confirmed"
                    );
                    metrics::record_confirmation("confirmed", waited);
                    return Ok(info);
                }
                Verdict::Rejected => {
                    tracing::warn!(tx_id = %tx_id, pool_error = %info.pool_error, "Transaction rejected");
                    metrics::record_confirmation("rejected", waited);
                    return Err(Web3Error::TransactionRejected {
                        tx_id: tx_id.to_string(),
                        pool_error: info.pool_error,
                    });
                }
                Verdict::Pending => {
                    tracing::debug!(tx_id = %tx_id, round = current, "Waiting for next round");
                }
            }

            self.node.status_after_block(current).await?;
            current += 1;
        }

        tracing::warn!(tx_id = %tx_id, rounds = max_rounds, "Confirmation timed out");
        metrics::record_confirmation("timeout", max_rounds);
        Err(Web3Error::ConfirmationTimeout {
            tx_id: tx_id.to_string(),
            rounds: max_rounds,
        })
    }
}
