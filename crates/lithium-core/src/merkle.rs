//! Sorted-leaf Merkle tree with a single top-bit direction tag.
//!
//! Leaves are hashed once, sorted ascending by numeric value, and then
//! paired level by level until one root remains. Every node in the tree has
//! bit 255 clear; a proof's sibling elements borrow that spare bit to record
//! whether the sibling sits on the left or the right, so no separate
//! direction vector ever needs to travel on the wire.

use std::sync::LazyLock;

use alloy_primitives::B256;

use crate::encoding::keccak;
use crate::error::LithiumError;

/// `keccak256("merkle-tree-extra")` with bit 255 cleared, used to pad an
/// odd-width level so every level has an even number of entries.
static SENTINEL: LazyLock<B256> = LazyLock::new(|| merkle_hash(b"merkle-tree-extra"));

const TOP_BIT: u8 = 0x80;

fn top_bit_set(node: &B256) -> bool {
    node[0] & TOP_BIT != 0
}

fn with_top_bit_set(mut node: B256) -> B256 {
    node[0] |= TOP_BIT;
    node
}

fn with_top_bit_clear(mut node: B256) -> B256 {
    node[0] &= !TOP_BIT;
    node
}

/// Hash arbitrary bytes and clear bit 255, placing the result inside the
/// 255-bit domain the direction tag borrows its spare bit from.
fn merkle_hash(data: impl AsRef<[u8]>) -> B256 {
    with_top_bit_clear(keccak(data))
}

/// Hash two already-domain-reduced nodes together (`H(left || right)`), then
/// clear the top bit of the result again.
fn hash_pair(left: &B256, right: &B256) -> B256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(left.as_slice());
    buf[32..].copy_from_slice(right.as_slice());
    merkle_hash(buf)
}

/// A constructed Merkle tree: every level from the sorted, hashed leaves up
/// to the single-element root level.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<B256>>,
    root: B256,
}

impl MerkleTree {
    /// Build a tree over `items`, each hashed with [`keccak`] and reduced
    /// into the 255-bit domain. An empty item list yields the zero root with
    /// a single `[0]` level, matching the reference implementation.
    pub fn build<I>(items: &[I]) -> Self
    where
        I: AsRef<[u8]>,
    {
        if items.is_empty() {
            return Self {
                levels: vec![vec![B256::ZERO]],
                root: B256::ZERO,
            };
        }

        let mut level: Vec<B256> = items.iter().map(merkle_hash).collect();
        level.sort();
        if level.len() % 2 != 0 {
            level.push(*SENTINEL);
        }

        let mut levels = vec![level];
        loop {
            let current = levels.last().unwrap();
            let mut next: Vec<B256> = current
                .chunks_exact(2)
                .map(|pair| hash_pair(&pair[0], &pair[1]))
                .collect();

            let done = next.len() == 1;
            if !done && next.len() % 2 != 0 {
                next.push(*SENTINEL);
            }
            levels.push(next);
            if done {
                break;
            }
        }

        let root = levels.last().unwrap()[0];
        Self { levels, root }
    }

    /// The tree's root.
    pub fn root(&self) -> B256 {
        self.root
    }

    /// All levels, level 0 (sorted leaf hashes) first. Every level but the
    /// root is stored already padded with the sentinel where its width was
    /// odd, so indices line up one-to-one with the pairing used to build
    /// the next level up.
    pub fn levels(&self) -> &[Vec<B256>] {
        &self.levels
    }

    /// The sibling path from `item` to the root, with each sibling's top bit
    /// set iff it is the *right* child (equivalently: `item`'s position at
    /// that level is even, i.e. it is the left child).
    ///
    /// Fails with [`LithiumError::NotFound`] if `item` is not present at
    /// level 0. If duplicate leaves hash identically, the first occurrence
    /// is used.
    pub fn path<I>(&self, item: &I) -> Result<Vec<B256>, LithiumError>
    where
        I: AsRef<[u8]>,
    {
        let target = merkle_hash(item);
        let mut idx = self.levels[0]
            .iter()
            .position(|node| *node == target)
            .ok_or_else(|| LithiumError::NotFound("leaf not present in tree".to_string()))?;

        let mut path = Vec::with_capacity(self.levels.len() - 1);
        for level in &self.levels[..self.levels.len() - 1] {
            if idx % 2 == 0 {
                path.push(with_top_bit_set(level[idx + 1]));
            } else {
                path.push(level[idx - 1]);
            }
            idx /= 2;
        }
        Ok(path)
    }
}

/// Verify that `leaf`, combined with `path`, reduces to `root`.
///
/// Reads each path element's top bit to choose between `H(node, sibling)`
/// and `H(sibling, node)`.
pub fn verify_path<I>(leaf: &I, path: &[B256], root: B256) -> bool
where
    I: AsRef<[u8]>,
{
    let mut node = merkle_hash(leaf);
    for sibling in path {
        node = if top_bit_set(sibling) {
            hash_pair(&node, &with_top_bit_clear(*sibling))
        } else {
            hash_pair(sibling, &node)
        };
    }
    node == root
}
