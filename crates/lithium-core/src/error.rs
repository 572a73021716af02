//! Error taxonomy shared by every stage of the relay pipeline.

/// Failure modes of the fixed-width encoders and `scan_hex` in [`crate::encoding`].
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    #[error("decoded value is {0} bytes, exceeds the 32-byte (256-bit) domain")]
    TooLarge(usize),
}

/// Top-level error type returned by every public `lithium-core` operation.
#[derive(Debug, thiserror::Error)]
pub enum LithiumError {
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Transport or upstream RPC failure. Transient in the relay loop
    /// (re-planned next tick), fatal in the proof builder.
    #[error("rpc error: {0}")]
    Rpc(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Requested leaf absent from the tree, or a log index beyond the
    /// transaction's log count.
    #[error("not found: {0}")]
    NotFound(String),

    /// A freshly-built proof failed to verify against its own tree. Should
    /// be unreachable; indicates a bug or a reorg between the two fetches
    /// `proof_for_tx`/`proof_for_event` perform.
    #[error("proof construction error: {0}")]
    ProofConstruction(String),

    /// The destination height advanced underneath us between plan and
    /// submit. Recovered by replanning.
    #[error("destination height advanced under us")]
    HeightRace,

    /// `Update` receipt had `status == 0`.
    #[error("submission rejected on-chain: {0}")]
    Submission(String),

    /// Post-submit height or root readback did not match what was sent.
    #[error("post-submit consistency check failed: {0}")]
    Consistency(String),

    #[error("relay already running")]
    AlreadyRunning,

    #[error("relay is not running")]
    NotRunning,
}

impl LithiumError {
    /// Wrap an arbitrary transport-layer error as [`LithiumError::Rpc`].
    pub fn rpc(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Rpc(Box::new(err))
    }

    /// Whether the relay loop should recover from this error by replanning,
    /// rather than stopping `run()`.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Rpc(_) | Self::HeightRace)
    }
}

pub type Result<T, E = LithiumError> = std::result::Result<T, E>;
