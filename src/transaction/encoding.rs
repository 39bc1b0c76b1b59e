//! Transaction fields, canonical encoding, ids and group ids.
//!
//! # Canonical form
//! - MessagePack map, keys sorted bytewise
//! - zero / empty values omitted, recursively
//! - integers in their smallest width
//!
//! Identical field sets therefore always produce identical bytes.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use data_encoding::BASE32_NOPAD;
use rmpv::Value;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512_256};
use thiserror::Error;

use crate::node::types::SuggestedParams;

/// Domain separator for transaction ids.
const TX_PREFIX: &[u8] = b"TX";
/// Domain separator for group ids.
const GROUP_PREFIX: &[u8] = b"TG";
/// Field holding the group id.
pub const GROUP_FIELD: &str = "grp";
/// Bytes a single signature adds to an encoded transaction.
const SIGNATURE_OVERHEAD: u64 = 75;

/// Errors raised while building or encoding transactions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("MessagePack encoding failed: {0}")]
    Msgpack(String),

    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

/// Result type for encoding operations.
pub type EncodingResult<T> = Result<T, EncodingError>;

/// A transaction field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Uint(u64),
    Bytes(Vec<u8>),
    Text(String),
    Bool(bool),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    fn is_empty(&self) -> bool {
        match self {
            FieldValue::Uint(v) => *v == 0,
            FieldValue::Bytes(v) => v.is_empty(),
            FieldValue::Text(v) => v.is_empty(),
            FieldValue::Bool(v) => !*v,
            FieldValue::List(v) => v.is_empty(),
            FieldValue::Map(v) => v.values().all(FieldValue::is_empty),
        }
    }

    fn to_msgpack(&self) -> Value {
        match self {
            FieldValue::Uint(v) => Value::from(*v),
            FieldValue::Bytes(v) => Value::Binary(v.clone()),
            FieldValue::Text(v) => Value::from(v.as_str()),
            FieldValue::Bool(v) => Value::Boolean(*v),
            FieldValue::List(items) => {
                Value::Array(items.iter().map(FieldValue::to_msgpack).collect())
            }
            FieldValue::Map(map) => canonical_map(map),
        }
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Uint(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        FieldValue::Bytes(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&Address> for FieldValue {
    fn from(v: &Address) -> Self {
        FieldValue::Bytes(v.0.to_vec())
    }
}

fn canonical_map(map: &BTreeMap<String, FieldValue>) -> Value {
    // BTreeMap<String, _> iterates in bytewise key order.
    Value::Map(
        map.iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (Value::from(k.as_str()), v.to_msgpack()))
            .collect(),
    )
}

fn write_msgpack(value: &Value) -> EncodingResult<Vec<u8>> {
    let mut buf = Vec::new();
    rmpv::encode::write_value(&mut buf, value)
        .map_err(|e| EncodingError::Msgpack(e.to_string()))?;
    Ok(buf)
}

fn sha512_256(prefix: &[u8], body: &[u8]) -> [u8; 32] {
    let mut hasher = Sha512_256::new();
    hasher.update(prefix);
    hasher.update(body);
    hasher.finalize().into()
}

/// 32-byte account public key.
///
/// Text form: base32 (no padding) of key followed by the last four bytes of
/// its SHA-512/256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 32]);

impl Address {
    fn checksum(&self) -> [u8; 4] {
        let digest = sha512_256(&[], &self.0);
        [digest[28], digest[29], digest[30], digest[31]]
    }
}

impl std::str::FromStr for Address {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EncodingError::InvalidAddress(s.to_string());
        let raw = BASE32_NOPAD.decode(s.as_bytes()).map_err(|_| invalid())?;
        if raw.len() != 36 {
            return Err(invalid());
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&raw[..32]);
        let address = Address(key);
        if raw[32..] != address.checksum() {
            return Err(invalid());
        }
        Ok(address)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut raw = Vec::with_capacity(36);
        raw.extend_from_slice(&self.0);
        raw.extend_from_slice(&self.checksum());
        f.write_str(&BASE32_NOPAD.encode(&raw))
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// Shared identifier binding the members of a group.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(pub [u8; 32]);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&BASE64.encode(self.0))
    }
}

impl std::fmt::Debug for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GroupId({})", self)
    }
}

/// An unsigned transaction as a set of named fields.
///
/// The core only touches `grp`; every other field is opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    fields: BTreeMap<String, FieldValue>,
}

impl RawTransaction {
    /// Start a transaction of the given `type` (e.g. "pay", "axfer", "appl").
    pub fn new(kind: &str) -> Self {
        Self::default().with_field("type", kind)
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn remove_field(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    /// Apply validity window, genesis and fee from suggested params.
    pub fn with_params(mut self, params: &SuggestedParams) -> EncodingResult<Self> {
        let genesis_hash =
            BASE64
                .decode(&params.genesis_hash)
                .map_err(|e| EncodingError::InvalidField {
                    field: "gh".to_string(),
                    reason: e.to_string(),
                })?;
        self.set_field("fv", params.first_valid);
        self.set_field("lv", params.last_valid);
        self.set_field("gen", params.genesis_id.as_str());
        self.set_field("gh", genesis_hash);

        // A flat fee is taken as given, so group members may carry 0.
        let fee = if params.flat_fee {
            params.fee
        } else {
            self.set_field("fee", params.fee);
            let estimated = self.encode_unsigned()?.len() as u64 + SIGNATURE_OVERHEAD;
            params.fee.saturating_mul(estimated).max(params.min_fee)
        };
        self.set_field("fee", fee);
        Ok(self)
    }

    /// A payment of `amount` base units.
    pub fn payment(
        sender: &Address,
        receiver: &Address,
        amount: u64,
        params: &SuggestedParams,
    ) -> EncodingResult<Self> {
        Self::new("pay")
            .with_field("snd", sender)
            .with_field("rcv", receiver)
            .with_field("amt", amount)
            .with_params(params)
    }

    /// Canonical unsigned encoding: the bytes a signer signs over, minus the
    /// domain prefix.
    pub fn encode_unsigned(&self) -> EncodingResult<Vec<u8>> {
        write_msgpack(&canonical_map(&self.fields))
    }

    /// Raw 32-byte transaction id.
    pub fn raw_tx_id(&self) -> EncodingResult<[u8; 32]> {
        Ok(sha512_256(TX_PREFIX, &self.encode_unsigned()?))
    }

    /// Transaction id in the textual form nodes report.
    pub fn tx_id(&self) -> EncodingResult<String> {
        Ok(BASE32_NOPAD.encode(&self.raw_tx_id()?))
    }

    pub fn group_id(&self) -> Option<GroupId> {
        match self.fields.get(GROUP_FIELD) {
            Some(FieldValue::Bytes(bytes)) if bytes.len() == 32 => {
                let mut id = [0u8; 32];
                id.copy_from_slice(bytes);
                Some(GroupId(id))
            }
            _ => None,
        }
    }
}

/// Compute the group id of an ordered sequence.
///
/// Any existing `grp` on a member is ignored, so regrouping is stable.
pub fn compute_group_id(txns: &[RawTransaction]) -> EncodingResult<GroupId> {
    let mut ids = Vec::with_capacity(txns.len());
    for txn in txns {
        let mut stripped = txn.clone();
        stripped.remove_field(GROUP_FIELD);
        ids.push(Value::Binary(stripped.raw_tx_id()?.to_vec()));
    }
    let group = Value::Map(vec![(Value::from("txlist"), Value::Array(ids))]);
    Ok(GroupId(sha512_256(GROUP_PREFIX, &write_msgpack(&group)?)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SuggestedParams {
        SuggestedParams {
            fee: 0,
            min_fee: 1000,
            flat_fee: false,
            first_valid: 100,
            last_valid: 1100,
            genesis_id: "testnet-v1.0".to_string(),
            genesis_hash: "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=".to_string(),
        }
    }

    fn addr(byte: u8) -> Address {
        Address([byte; 32])
    }

    #[test]
    fn test_zero_address_text() {
        assert_eq!(
            Address([0u8; 32]).to_string(),
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ"
        );
        let parsed: Address = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ"
            .parse()
            .unwrap();
        assert_eq!(parsed, Address([0u8; 32]));
    }

    #[test]
    fn test_address_checksum_rejected() {
        let mut text = addr(7).to_string();
        let last = text.pop().unwrap();
        text.push(if last == 'A' { 'B' } else { 'A' });
        assert!(text.parse::<Address>().is_err());
        assert!("not-base32".parse::<Address>().is_err());
    }

    #[test]
    fn test_encoding_is_canonical() {
        let a = RawTransaction::new("pay")
            .with_field("amt", 5u64)
            .with_field("snd", &addr(1))
            .with_field("note", Vec::<u8>::new())
            .with_field("close", 0u64);
        let b = RawTransaction::new("pay")
            .with_field("snd", &addr(1))
            .with_field("amt", 5u64);

        // Empty fields vanish and insertion order does not matter.
        assert_eq!(a.encode_unsigned().unwrap(), b.encode_unsigned().unwrap());

        // fixmap(3) {"amt": 5, "snd": bin(32), "type": "pay"}
        let bytes = b.encode_unsigned().unwrap();
        assert_eq!(bytes[0], 0x83);
        assert_eq!(&bytes[1..5], &[0xa3, b'a', b'm', b't']);
        assert_eq!(bytes[5], 0x05);
    }

    #[test]
    fn test_payment_fee_floor() {
        let txn = RawTransaction::payment(&addr(1), &addr(2), 10, &params()).unwrap();
        assert_eq!(txn.field("fee"), Some(&FieldValue::Uint(1000)));
        assert_eq!(txn.field("fv"), Some(&FieldValue::Uint(100)));
        assert_eq!(txn.field("lv"), Some(&FieldValue::Uint(1100)));
        assert!(matches!(txn.field("gh"), Some(FieldValue::Bytes(b)) if b.len() == 32));
    }

    #[test]
    fn test_payment_fee_per_byte() {
        let mut p = params();
        p.fee = 10;
        let txn = RawTransaction::payment(&addr(1), &addr(2), 10, &p).unwrap();
        match txn.field("fee") {
            Some(FieldValue::Uint(fee)) => assert!(*fee > 1000),
            other => panic!("unexpected fee {:?}", other),
        }
    }

    #[test]
    fn test_per_byte_estimate_counts_fee_field() {
        let mut p = params();
        p.fee = 10;
        let txn = RawTransaction::payment(&addr(1), &addr(2), 10, &p).unwrap();

        let sized = txn.clone().with_field("fee", 10u64);
        let expected = 10 * (sized.encode_unsigned().unwrap().len() as u64 + 75);
        assert_eq!(txn.field("fee"), Some(&FieldValue::Uint(expected)));
    }

    #[test]
    fn test_flat_fee_zero_for_pooling() {
        let mut p = params();
        p.flat_fee = true;
        p.fee = 0;
        let txn = RawTransaction::payment(&addr(1), &addr(2), 10, &p).unwrap();
        assert_eq!(txn.field("fee"), Some(&FieldValue::Uint(0)));

        let without_fee = {
            let mut t = txn.clone();
            t.remove_field("fee");
            t
        };
        assert_eq!(
            txn.encode_unsigned().unwrap(),
            without_fee.encode_unsigned().unwrap()
        );
    }

    #[test]
    fn test_flat_fee_below_minimum_kept() {
        let mut p = params();
        p.flat_fee = true;
        p.fee = 500;
        let txn = RawTransaction::payment(&addr(1), &addr(2), 10, &p).unwrap();
        assert_eq!(txn.field("fee"), Some(&FieldValue::Uint(500)));

        p.fee = 3000;
        let txn = RawTransaction::payment(&addr(1), &addr(2), 10, &p).unwrap();
        assert_eq!(txn.field("fee"), Some(&FieldValue::Uint(3000)));
    }

    #[test]
    fn test_bad_genesis_hash() {
        let mut p = params();
        p.genesis_hash = "***".to_string();
        let err = RawTransaction::payment(&addr(1), &addr(2), 10, &p).unwrap_err();
        assert!(matches!(err, EncodingError::InvalidField { .. }));
    }

    #[test]
    fn test_group_id_depends_on_order() {
        let t1 = RawTransaction::new("pay").with_field("amt", 1u64);
        let t2 = RawTransaction::new("pay").with_field("amt", 2u64);

        let forward = compute_group_id(&[t1.clone(), t2.clone()]).unwrap();
        let again = compute_group_id(&[t1.clone(), t2.clone()]).unwrap();
        let reversed = compute_group_id(&[t2, t1]).unwrap();

        assert_eq!(forward, again);
        assert_ne!(forward, reversed);
    }

    #[test]
    fn test_group_id_ignores_stale_group() {
        let t1 = RawTransaction::new("pay").with_field("amt", 1u64);
        let stale = t1.clone().with_field(GROUP_FIELD, vec![9u8; 32]);
        assert_eq!(
            compute_group_id(&[t1]).unwrap(),
            compute_group_id(&[stale]).unwrap()
        );
    }

    #[test]
    fn test_tx_id_shape() {
        let txn = RawTransaction::new("pay").with_field("amt", 1u64);
        let id = txn.tx_id().unwrap();
        assert_eq!(id.len(), 52);
        assert_eq!(id, txn.tx_id().unwrap());
    }
}
