//! Turns a single source-chain height into a [`Block`]: one Merkle tree over
//! every eligible transaction and log at that height.

use alloy_primitives::B256;

use crate::error::LithiumError;
use crate::leaf::{LogInner, OuterLeaf, TxInner};
use crate::merkle::MerkleTree;
use crate::rpc::ChainRpc;

/// A processed source-chain block: its Merkle root over all eligible leaves,
/// the block hash as reported by the source chain, and the leaves
/// themselves in pre-sort production order (tx leaf, then its logs, per
/// transaction, in listed transaction order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub height: u64,
    pub root: B256,
    pub hash: B256,
    pub items: Vec<OuterLeaf>,
}

/// Fetch block `height` from `rpc` and build its [`Block`] record.
///
/// Contract-creation transactions (`to` absent) contribute no leaves, and
/// their logs are skipped with them. Returns the block plus `(tx_count,
/// log_count)`, the number of eligible transactions and logs actually
/// turned into leaves.
pub async fn process_block(
    rpc: &impl ChainRpc,
    height: u64,
) -> Result<(Block, usize, usize), LithiumError> {
    let block = rpc
        .get_block_by_number(height)
        .await?
        .ok_or_else(|| LithiumError::NotFound(format!("no block at height {height}")))?;

    let mut items = Vec::new();
    let mut tx_count = 0usize;
    let mut log_count = 0usize;

    for (tx_index, tx_hash) in block.transactions.iter().enumerate() {
        let tx_index = tx_index as u32;
        let tx = rpc
            .get_transaction_by_hash(*tx_hash)
            .await?
            .ok_or_else(|| LithiumError::NotFound(format!("transaction {tx_hash} vanished")))?;

        let Some(to) = tx.to else {
            // Contract creation: no leaf, no logs.
            continue;
        };

        let tx_inner = TxInner {
            from: tx.from,
            to,
            value: tx.value,
            input: tx.input,
        };
        items.push(OuterLeaf::for_transaction(block.hash, tx_index, &tx_inner));
        tx_count += 1;

        let receipt = rpc
            .get_transaction_receipt(*tx_hash)
            .await?
            .ok_or_else(|| LithiumError::NotFound(format!("receipt for {tx_hash} vanished")))?;

        for (log_index, log) in receipt.logs.iter().enumerate() {
            let log_inner = LogInner {
                address: log.address,
                topic0: log.topic0,
                data: log.data.clone(),
            };
            items.push(OuterLeaf::for_log(
                block.hash,
                tx_index,
                1 + log_index as u32,
                &log_inner,
            ));
            log_count += 1;
        }
    }

    let encoded: Vec<[u8; 72]> = items.iter().map(OuterLeaf::encode).collect();
    let tree = MerkleTree::build(&encoded);

    Ok((
        Block {
            height,
            root: tree.root(),
            hash: block.hash,
            items,
        },
        tx_count,
        log_count,
    ))
}
