//! Group, prepare, sign and submit.
//!
//! # Responsibilities
//! - Assign one group id over the final ordered sequence
//! - Encode each member into a `SigningRequest`
//! - Hand the whole group to the wallet in a single call
//! - Refuse to submit unless every member came back signed
//! - Forward the signed batch to the node in a single call
//!
//! Stages run strictly in order. A failure at any stage ends the send; no
//! stage is retried here.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::{Web3Error, Web3Result};
use crate::node::api::NodeApi;
use crate::observability::metrics;
use crate::transaction::encoding::{compute_group_id, GroupId, RawTransaction, GROUP_FIELD};
use crate::wallet::adapter::WalletAdapter;
use crate::wallet::types::{SignedPayload, SigningRequest};

/// Progress of one send operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStage {
    Grouped,
    Prepared,
    Signed,
    Submitted,
}

impl SendStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendStage::Grouped => "grouped",
            SendStage::Prepared => "prepared",
            SendStage::Signed => "signed",
            SendStage::Submitted => "submitted",
        }
    }
}

impl std::fmt::Display for SendStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Id the node reported for the batch; the one to poll.
    pub tx_id: String,
    pub group_id: GroupId,
    /// Locally computed ids of every member, in group order.
    pub member_ids: Vec<String>,
}

/// Drives one group from raw transactions to a node-accepted submission.
pub struct TransactionPipeline {
    node: Arc<dyn NodeApi>,
    wallet: Arc<dyn WalletAdapter>,
}

impl TransactionPipeline {
    pub fn new(node: Arc<dyn NodeApi>, wallet: Arc<dyn WalletAdapter>) -> Self {
        Self { node, wallet }
    }

    /// Bind `txns` into one group, writing the shared id into each member.
    ///
    /// A single transaction still gets a group id of its own. Length and
    /// order are never changed.
    pub fn group(txns: &mut [RawTransaction]) -> Web3Result<GroupId> {
        if txns.is_empty() {
            return Err(Web3Error::EmptyGroup);
        }
        let group_id = compute_group_id(txns)?;
        for txn in txns.iter_mut() {
            txn.set_field(GROUP_FIELD, group_id.0.to_vec());
        }
        Ok(group_id)
    }

    /// Encode each member for the signer, preserving order. Pure.
    pub fn prepare_for_signing(txns: &[RawTransaction]) -> Web3Result<Vec<SigningRequest>> {
        txns.iter()
            .map(|txn| -> Web3Result<SigningRequest> {
                Ok(SigningRequest::new(BASE64.encode(txn.encode_unsigned()?)))
            })
            .collect()
    }

    /// Ask the wallet to sign the group. Exactly one adapter call.
    pub async fn sign(&self, requests: &[SigningRequest]) -> Web3Result<Vec<SignedPayload>> {
        Ok(self.wallet.sign_transactions(requests).await?)
    }

    /// Turn the wallet reply into raw signed bytes.
    ///
    /// Any unsigned member fails the whole group.
    pub fn decode_signatures(expected: usize, signed: Vec<SignedPayload>) -> Web3Result<Vec<Vec<u8>>> {
        if signed.len() != expected {
            return Err(Web3Error::SignatureCountMismatch {
                expected,
                actual: signed.len(),
            });
        }
        signed
            .into_iter()
            .enumerate()
            .map(|(index, payload)| {
                let text = payload.ok_or(Web3Error::MissingSignature { index })?;
                BASE64
                    .decode(text.as_bytes())
                    .map_err(|e| Web3Error::InvalidSignature {
                        index,
                        reason: e.to_string(),
                    })
            })
            .collect()
    }

    /// Send the signed batch to the node in one call.
    pub async fn submit(&self, signed: &[Vec<u8>]) -> Web3Result<String> {
        Ok(self.node.send_raw_transactions(signed).await?)
    }

    /// Run every stage up to `Submitted`.
    ///
    /// `customize` may fill signing overrides (signers, auth address,
    /// message) per member after encoding; it cannot change the encoding.
    pub async fn run<F>(&self, mut txns: Vec<RawTransaction>, mut customize: F) -> Web3Result<Submission>
    where
        F: FnMut(usize, &mut SigningRequest) + Send,
    {
        let group_id = Self::group(&mut txns)?;
        let member_ids = txns
            .iter()
            .map(|txn| txn.tx_id())
            .collect::<Result<Vec<_>, _>>()?;
        advance(SendStage::Grouped);
        tracing::debug!(group_id = %group_id, members = txns.len(), "Transactions grouped");

        let mut requests = Self::prepare_for_signing(&txns)?;
        for (index, request) in requests.iter_mut().enumerate() {
            customize(index, request);
        }
        advance(SendStage::Prepared);

        let signed = self.sign(&requests).await?;
        let signed = match Self::decode_signatures(requests.len(), signed) {
            Ok(signed) => signed,
            Err(e) => {
                tracing::warn!(group_id = %group_id, error = %e, "Wallet reply unusable, nothing submitted");
                return Err(e);
            }
        };
        advance(SendStage::Signed);

        let tx_id = self.submit(&signed).await?;
        advance(SendStage::Submitted);
        tracing::info!(tx_id = %tx_id, group_id = %group_id, members = signed.len(), "Transaction group submitted");

        Ok(Submission {
            tx_id,
            group_id,
            member_ids,
        })
    }
}

fn advance(stage: SendStage) {
    tracing::debug!(stage = stage.as_str(), "Send stage reached");
    metrics::record_send_stage(stage.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::mock::MockNode;
    use crate::transaction::encoding::Address;
    use crate::wallet::mock::MockWallet;
    use crate::wallet::types::WalletError;

    fn addr(byte: u8) -> Address {
        Address([byte; 32])
    }

    fn txns() -> Vec<RawTransaction> {
        vec![
            RawTransaction::new("pay")
                .with_field("snd", &addr(1))
                .with_field("rcv", &addr(2))
                .with_field("amt", 1_000u64),
            RawTransaction::new("pay")
                .with_field("snd", &addr(2))
                .with_field("rcv", &addr(1))
                .with_field("amt", 500u64),
        ]
    }

    fn pipeline(node: &MockNode, wallet: &MockWallet) -> TransactionPipeline {
        TransactionPipeline::new(Arc::new(node.clone()), Arc::new(wallet.clone()))
    }

    #[test]
    fn test_group_assigns_shared_id() {
        let mut group = txns();
        let original = group.clone();
        let id = TransactionPipeline::group(&mut group).unwrap();

        assert_eq!(group.len(), 2);
        for (grouped, raw) in group.iter().zip(&original) {
            assert_eq!(grouped.group_id(), Some(id));
            assert_eq!(grouped.field("amt"), raw.field("amt"));
        }
    }

    #[test]
    fn test_regrouping_is_stable() {
        let mut group = txns();
        let first = TransactionPipeline::group(&mut group).unwrap();
        let second = TransactionPipeline::group(&mut group).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_order_changes_group_id() {
        let mut forward = txns();
        let mut reversed = txns();
        reversed.reverse();
        assert_ne!(
            TransactionPipeline::group(&mut forward).unwrap(),
            TransactionPipeline::group(&mut reversed).unwrap()
        );
    }

    #[test]
    fn test_single_member_gets_group_id() {
        let mut single = vec![txns().remove(0)];
        let id = TransactionPipeline::group(&mut single).unwrap();
        assert_eq!(single[0].group_id(), Some(id));
    }

    #[test]
    fn test_empty_group_rejected() {
        let mut empty: Vec<RawTransaction> = Vec::new();
        assert!(matches!(
            TransactionPipeline::group(&mut empty),
            Err(Web3Error::EmptyGroup)
        ));
    }

    #[test]
    fn test_prepare_is_deterministic() {
        let mut a = txns();
        let mut b = txns();
        TransactionPipeline::group(&mut a).unwrap();
        TransactionPipeline::group(&mut b).unwrap();

        let first = TransactionPipeline::prepare_for_signing(&a).unwrap();
        let second = TransactionPipeline::prepare_for_signing(&b).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(
            BASE64.decode(&first[1].txn).unwrap(),
            a[1].encode_unsigned().unwrap()
        );
    }

    #[test]
    fn test_decode_signatures() {
        let decoded = TransactionPipeline::decode_signatures(
            2,
            vec![Some(BASE64.encode(b"one")), Some(BASE64.encode(b"two"))],
        )
        .unwrap();
        assert_eq!(decoded, vec![b"one".to_vec(), b"two".to_vec()]);

        assert!(matches!(
            TransactionPipeline::decode_signatures(2, vec![Some(BASE64.encode(b"one")), None]),
            Err(Web3Error::MissingSignature { index: 1 })
        ));
        assert!(matches!(
            TransactionPipeline::decode_signatures(2, vec![None]),
            Err(Web3Error::SignatureCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert!(matches!(
            TransactionPipeline::decode_signatures(1, vec![Some("not base64!".to_string())]),
            Err(Web3Error::InvalidSignature { index: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_run_submits_once() {
        let node = MockNode::new();
        node.set_submit_result(Ok("GROUPTXID".to_string()));
        let wallet = MockWallet::connected("ACCOUNT");

        let submission = pipeline(&node, &wallet)
            .run(txns(), |_, _| {})
            .await
            .unwrap();

        assert_eq!(submission.tx_id, "GROUPTXID");
        assert_eq!(submission.member_ids.len(), 2);
        assert_eq!(wallet.received().len(), 1);
        assert_eq!(wallet.received()[0].len(), 2);
        assert_eq!(node.submitted().len(), 1);
        assert_eq!(node.submitted()[0].len(), 2);
    }

    #[tokio::test]
    async fn test_missing_signature_skips_submit() {
        let node = MockNode::new();
        let wallet = MockWallet::connected("ACCOUNT");
        wallet.push_reply(Ok(vec![Some(BASE64.encode(b"signed")), None]));

        let err = pipeline(&node, &wallet)
            .run(txns(), |_, _| {})
            .await
            .unwrap_err();

        assert!(matches!(err, Web3Error::MissingSignature { index: 1 }));
        assert_eq!(node.calls().send_raw_transactions, 0);
    }

    #[tokio::test]
    async fn test_wallet_errors_abort() {
        let node = MockNode::new();
        let wallet = MockWallet::connected("ACCOUNT");
        wallet.push_reply(Err(WalletError::Rejected("user declined".to_string())));

        let err = pipeline(&node, &wallet)
            .run(txns(), |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(err, Web3Error::Wallet(WalletError::Rejected(_))));
        assert_eq!(node.calls().send_raw_transactions, 0);

        let disconnected = MockWallet::new();
        let err = pipeline(&node, &disconnected)
            .run(txns(), |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(err, Web3Error::NotConnected));
    }

    #[tokio::test]
    async fn test_customize_sets_overrides() {
        let node = MockNode::new();
        let wallet = MockWallet::connected("ACCOUNT");

        pipeline(&node, &wallet)
            .run(txns(), |index, request| {
                if index == 1 {
                    request.signers = Some(Vec::new());
                    request.message = Some("counterparty signs".to_string());
                }
            })
            .await
            .unwrap();

        let received = wallet.received();
        assert_eq!(received[0][0].signers, None);
        assert_eq!(received[0][1].signers, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_node_rejection_surfaces() {
        let node = MockNode::new();
        node.set_submit_result(Err("overspend".to_string()));
        let wallet = MockWallet::connected("ACCOUNT");

        let err = pipeline(&node, &wallet)
            .run(txns(), |_, _| {})
            .await
            .unwrap_err();
        assert!(err.to_string().contains("overspend"));
    }
}
