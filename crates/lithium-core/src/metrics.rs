//! Relay metrics, scoped under the `lithium_` prefix. Named counters and
//! histograms are recorded directly through the plain `metrics` crate's
//! macros, behind a small zero-sized struct so call sites read uniformly.

use metrics::{counter, histogram};

/// Zero-sized handle onto the relay's named metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct LithiumMetrics;

impl LithiumMetrics {
    /// A source-chain block was processed and its root/hash pair included
    /// in a batch.
    #[inline]
    pub fn record_block_relayed(&self) {
        counter!("lithium_blocks_relayed_total").increment(1);
    }

    /// `n` leaves (transaction + log) were produced across a batch.
    #[inline]
    pub fn record_leaves_relayed(&self, n: u64) {
        counter!("lithium_leaves_relayed_total").increment(n);
    }

    /// An `Update` call was rejected on-chain or failed its consistency check.
    #[inline]
    pub fn record_submission_failure(&self) {
        counter!("lithium_submission_failures_total").increment(1);
    }

    /// A transient RPC error was recovered by replanning.
    #[inline]
    pub fn record_transient_error(&self) {
        counter!("lithium_transient_errors_total").increment(1);
    }

    /// Wall-clock duration of one plan→fetch→submit cycle, in seconds.
    #[inline]
    pub fn record_batch_latency(&self, duration_secs: f64) {
        histogram!("lithium_batch_latency_seconds").record(duration_secs);
    }
}
