//! Transport-agnostic seams the relay and proof builder are generic over.
//!
//! `lithium-core` never dials a socket itself. `lithium-rpc` supplies the
//! Alloy-backed implementations; tests supply in-process fakes. Both sides
//! only need to agree on these traits and the plain data they carry.

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::error::LithiumError;

/// A source-chain block, transaction hashes only (`eth_getBlockByNumber(height, false)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcBlock {
    pub hash: B256,
    pub transactions: Vec<B256>,
}

/// A source-chain transaction. `to: None` marks a contract-creation
/// transaction, which contributes no leaf.
///
/// `block_height`/`tx_index` mirror what real `eth_getTransactionByHash`
/// responses carry alongside the transaction body (`blockNumber`,
/// `transactionIndex`), letting the proof builder locate the enclosing
/// block from the transaction hash alone, per §4.5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcTransaction {
    pub hash: B256,
    pub block_height: u64,
    pub tx_index: u32,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub input: Vec<u8>,
}

/// A single log entry within a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcLog {
    pub address: Address,
    /// `topics[0]`, the event signature hash. A log with no topics cannot be
    /// represented by the leaf codec and is rejected by the block processor.
    pub topic0: B256,
    pub data: Vec<u8>,
}

/// A source-chain transaction receipt, logs in listed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcReceipt {
    pub logs: Vec<RpcLog>,
}

/// Source-chain read surface consumed by the block processor and proof
/// builder: `eth_blockNumber`, `eth_getBlockByNumber`,
/// `eth_getTransactionByHash`, `eth_getTransactionReceipt`.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn block_number(&self) -> Result<u64, LithiumError>;
    async fn get_block_by_number(&self, height: u64) -> Result<Option<RpcBlock>, LithiumError>;
    async fn get_transaction_by_hash(&self, hash: B256)
        -> Result<Option<RpcTransaction>, LithiumError>;
    async fn get_transaction_receipt(&self, hash: B256)
        -> Result<Option<RpcReceipt>, LithiumError>;
}

/// Receipt of a settled `Update` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateReceipt {
    pub status: u64,
}

/// A submitted-but-not-yet-settled `Update` call.
#[async_trait]
pub trait PendingUpdate: Send + Sync {
    async fn wait(self: Box<Self>) -> Result<UpdateReceipt, LithiumError>;
}

/// Destination-chain write surface: `GetHeight`, `GetMerkleRoot`, `Update`.
#[async_trait]
pub trait DestinationContract: Send + Sync {
    async fn get_height(&self) -> Result<u64, LithiumError>;
    async fn get_merkle_root(&self, height: u64) -> Result<B256, LithiumError>;
    /// `flat_pairs` is `[root_0, hash_0, root_1, hash_1, ...]` in ascending
    /// height order, one pair per block in the batch.
    async fn update(
        &self,
        prev_height: u64,
        flat_pairs: Vec<B256>,
    ) -> Result<Box<dyn PendingUpdate>, LithiumError>;
}
