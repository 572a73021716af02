//! Core of the Lithium cross-chain relay: deterministic leaf encoding, a
//! sorted-leaf Merkle tree with a single-bit direction tag, a block
//! processor, a proof builder, and the plan -> fetch -> submit relay loop.
//!
//! Transport-agnostic: every RPC/contract interaction goes through the
//! [`rpc::ChainRpc`] / [`rpc::DestinationContract`] seams, so this crate
//! never dials a socket. `lithium-rpc` supplies the Alloy-backed
//! implementations used in production.

pub mod block;
pub mod encoding;
pub mod error;
pub mod leaf;
pub mod merkle;
pub mod metrics;
pub mod proof;
pub mod relay;
pub mod rpc;

pub use block::{process_block, Block};
pub use error::{EncodingError, LithiumError, Result};
pub use leaf::{LogInner, OuterLeaf, TxInner, LOG_INNER_LEN, OUTER_LEAF_LEN, TX_INNER_LEN};
pub use merkle::{verify_path, MerkleTree};
pub use metrics::LithiumMetrics;
pub use proof::{proof_for_event, proof_for_tx, verify_proof, ProofBlob};
pub use relay::Lithium;
pub use rpc::{
    ChainRpc, DestinationContract, PendingUpdate, RpcBlock, RpcLog, RpcReceipt, RpcTransaction,
    UpdateReceipt,
};
