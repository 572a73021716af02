//! Alloy-backed `ChainRpc`/`DestinationContract` implementations for
//! Lithium, plus the jittered-backoff retry helper shared by both.

pub mod contract;
pub mod provider;
pub mod retry;

pub use contract::AlloyDestinationContract;
pub use provider::AlloyChainRpc;
pub use retry::with_retry;
