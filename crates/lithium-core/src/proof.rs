//! Proof blob construction and verification: §4.5/§6 wire format.
//!
//! ```text
//! block_height_be64(8) || tx_index_be32(4) || log_index_be32(4) || sibling_be256 x N
//! ```

use alloy_primitives::B256;

use crate::block::process_block;
use crate::encoding::{u32_be, u64_be};
use crate::error::LithiumError;
use crate::leaf::OuterLeaf;
use crate::merkle::{verify_path, MerkleTree};
use crate::rpc::ChainRpc;

const PREFIX_LEN: usize = 16;

/// Serialized `(prefix, path)` proof: `block_height_be64 || tx_index_be32 ||
/// log_index_be32 || sibling_be256 x N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofBlob(pub Vec<u8>);

impl ProofBlob {
    fn new(height: u64, tx_index: u32, log_index: u32, path: &[B256]) -> Self {
        let mut out = Vec::with_capacity(PREFIX_LEN + path.len() * 32);
        out.extend_from_slice(&u64_be(height));
        out.extend_from_slice(&u32_be(tx_index));
        out.extend_from_slice(&u32_be(log_index));
        for sibling in path {
            out.extend_from_slice(sibling.as_slice());
        }
        Self(out)
    }

    /// Validate the wire-length invariant: `len >= 48` and `(len - 16) % 32 == 0`.
    pub fn check_length(&self) -> bool {
        self.0.len() >= PREFIX_LEN + 32 && (self.0.len() - PREFIX_LEN) % 32 == 0
    }

    /// The 16-byte `(block_height, tx_index, log_index)` prefix, informational only:
    /// the caller must independently bind it to a claimed block/tx/log tuple.
    pub fn prefix(&self) -> Option<(u64, u32, u32)> {
        if self.0.len() < PREFIX_LEN {
            return None;
        }
        let height = u64::from_be_bytes(self.0[0..8].try_into().ok()?);
        let tx_index = u32::from_be_bytes(self.0[8..12].try_into().ok()?);
        let log_index = u32::from_be_bytes(self.0[12..16].try_into().ok()?);
        Some((height, tx_index, log_index))
    }

    /// The sibling path, one `B256` per 32-byte chunk after the prefix.
    pub fn path(&self) -> Option<Vec<B256>> {
        if !self.check_length() {
            return None;
        }
        Some(
            self.0[PREFIX_LEN..]
                .chunks_exact(32)
                .map(B256::from_slice)
                .collect(),
        )
    }
}

async fn rebuild_tree(
    rpc: &impl ChainRpc,
    height: u64,
) -> Result<(MerkleTree, Vec<OuterLeaf>), LithiumError> {
    let (block, _, _) = process_block(rpc, height).await?;
    let encoded: Vec<[u8; 72]> = block.items.iter().map(OuterLeaf::encode).collect();
    let tree = MerkleTree::build(&encoded);
    Ok((tree, block.items))
}

fn path_for(
    tree: &MerkleTree,
    items: &[OuterLeaf],
    tx_index: u32,
    log_index: u32,
    not_found: impl FnOnce() -> String,
) -> Result<Vec<B256>, LithiumError> {
    let leaf = items
        .iter()
        .find(|item| item.tx_index == tx_index && item.log_index == log_index)
        .ok_or_else(|| LithiumError::NotFound(not_found()))?;

    let encoded = leaf.encode();
    let path = tree.path(&encoded)?;
    if !verify_path(&encoded, &path, tree.root()) {
        return Err(LithiumError::ProofConstruction(
            "freshly built proof failed self-verification".to_string(),
        ));
    }
    Ok(path)
}

/// Build a proof for `tx_hash`: fetch the transaction, re-process its
/// enclosing block, and locate the transaction's own outer leaf
/// (`log_index == 0`).
pub async fn proof_for_tx(rpc: &impl ChainRpc, tx_hash: B256) -> Result<ProofBlob, LithiumError> {
    let tx = rpc
        .get_transaction_by_hash(tx_hash)
        .await?
        .ok_or_else(|| LithiumError::NotFound(format!("transaction {tx_hash} not found")))?;

    let (tree, items) = rebuild_tree(rpc, tx.block_height).await?;
    let path = path_for(&tree, &items, tx.tx_index, 0, || {
        format!("leaf for transaction {tx_hash} missing from rebuilt tree")
    })?;
    Ok(ProofBlob::new(tx.block_height, tx.tx_index, 0, &path))
}

/// Build a proof for the `log_idx`-th log of `tx_hash`. Fails `NotFound` if
/// `log_idx` is beyond the transaction's log count.
pub async fn proof_for_event(
    rpc: &impl ChainRpc,
    tx_hash: B256,
    log_idx: u32,
) -> Result<ProofBlob, LithiumError> {
    let tx = rpc
        .get_transaction_by_hash(tx_hash)
        .await?
        .ok_or_else(|| LithiumError::NotFound(format!("transaction {tx_hash} not found")))?;

    let (tree, items) = rebuild_tree(rpc, tx.block_height).await?;
    // The log's outer leaf sits at log_index = 1 + log_idx (index 0 is the
    // transaction's own leaf), but the wire prefix binds to the raw,
    // 0-based event index a caller actually asked for.
    let path = path_for(&tree, &items, tx.tx_index, 1 + log_idx, || {
        format!("log index {log_idx} out of range for transaction {tx_hash}")
    })?;
    Ok(ProofBlob::new(tx.block_height, tx.tx_index, log_idx, &path))
}

/// Verify `blob` proves `leaf` is included under `root`. `leaf` must already
/// be the encoded 72-byte outer leaf; the caller binds the blob's prefix to
/// a claimed `(block, tx, log)` tuple separately.
pub fn verify_proof(root: B256, leaf: &[u8; 72], blob: &ProofBlob) -> bool {
    let Some(path) = blob.path() else {
        return false;
    };
    verify_path(leaf, &path, root)
}
