//! Deterministic byte layouts for transaction and log leaves, folded into a
//! position-binding outer leaf before being placed in the Merkle tree.
//!
//! ```text
//! tx inner:  from(20) || to(20) || value_be(32) || keccak256(input)(32)   = 104 B
//! log inner: address(20) || topic0(32) || keccak256(data)(32)            =  84 B
//! outer:     block_hash(32) || tx_index_be32(4) || log_index_be32(4)
//!              || keccak256(inner)(32)                                   =  72 B
//! ```
//!
//! Without the outer prefix, two semantically identical events in different
//! blocks would hash identically and a verifier could not tell a
//! transaction leaf from its own log leaves.

use alloy_primitives::{Address, B256, U256};

use crate::encoding::{keccak, u256_be, u32_be};

/// Wire length of a transaction inner leaf.
pub const TX_INNER_LEN: usize = 104;
/// Wire length of a log inner leaf.
pub const LOG_INNER_LEN: usize = 84;
/// Wire length of an outer leaf.
pub const OUTER_LEAF_LEN: usize = 72;

/// `from || to || value || keccak256(input)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInner {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub input: Vec<u8>,
}

impl TxInner {
    pub fn encode(&self) -> [u8; TX_INNER_LEN] {
        let mut out = [0u8; TX_INNER_LEN];
        out[0..20].copy_from_slice(self.from.as_slice());
        out[20..40].copy_from_slice(self.to.as_slice());
        out[40..72].copy_from_slice(&u256_be(self.value));
        out[72..104].copy_from_slice(keccak(&self.input).as_slice());
        out
    }
}

/// `address || topic0 || keccak256(data)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogInner {
    pub address: Address,
    pub topic0: B256,
    pub data: Vec<u8>,
}

impl LogInner {
    pub fn encode(&self) -> [u8; LOG_INNER_LEN] {
        let mut out = [0u8; LOG_INNER_LEN];
        out[0..20].copy_from_slice(self.address.as_slice());
        out[20..52].copy_from_slice(self.topic0.as_slice());
        out[52..84].copy_from_slice(keccak(&self.data).as_slice());
        out
    }
}

/// `block_hash || tx_index || log_index || keccak256(inner)`. This is the
/// value actually placed in the Merkle tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OuterLeaf {
    pub block_hash: B256,
    pub tx_index: u32,
    pub log_index: u32,
    pub inner_hash: B256,
}

impl OuterLeaf {
    /// Outer leaf for a transaction (log index fixed at `0`).
    pub fn for_transaction(block_hash: B256, tx_index: u32, inner: &TxInner) -> Self {
        Self {
            block_hash,
            tx_index,
            log_index: 0,
            inner_hash: keccak(inner.encode()),
        }
    }

    /// Outer leaf for the `log_index`-th log of a transaction.
    pub fn for_log(block_hash: B256, tx_index: u32, log_index: u32, inner: &LogInner) -> Self {
        Self {
            block_hash,
            tx_index,
            log_index,
            inner_hash: keccak(inner.encode()),
        }
    }

    pub fn encode(&self) -> [u8; OUTER_LEAF_LEN] {
        let mut out = [0u8; OUTER_LEAF_LEN];
        out[0..32].copy_from_slice(self.block_hash.as_slice());
        out[32..36].copy_from_slice(&u32_be(self.tx_index));
        out[36..40].copy_from_slice(&u32_be(self.log_index));
        out[40..72].copy_from_slice(self.inner_hash.as_slice());
        out
    }
}
