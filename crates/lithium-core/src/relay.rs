//! The relay control loop: plan -> fetch -> submit, driven against a
//! `ChainRpc` source and a `DestinationContract` sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::B256;
use tracing::{info, instrument, warn};

use crate::block::{process_block, Block};
use crate::error::LithiumError;
use crate::metrics::LithiumMetrics;
use crate::rpc::{ChainRpc, DestinationContract};

/// Idle duration between plan cycles when the destination cursor has
/// already caught up to the source tip.
const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_secs(1);

/// One plan -> fetch -> submit relay instance. Generic over the source RPC
/// and destination contract adapter, so the same control loop drives both
/// the real Alloy-backed transports and the in-process fakes used in tests.
pub struct Lithium<R, C> {
    rpc_source: R,
    contract_dest: C,
    batch_size: u32,
    idle_interval: Duration,
    running: Arc<AtomicBool>,
    metrics: LithiumMetrics,
}

impl<R, C> Lithium<R, C>
where
    R: ChainRpc,
    C: DestinationContract,
{
    /// `batch_size` must be greater than zero; it is the sole knob for
    /// bounding one submission's size.
    pub fn new(rpc_source: R, contract_dest: C, batch_size: u32) -> Self {
        assert!(batch_size > 0, "batch_size must be greater than zero");
        Self {
            rpc_source,
            contract_dest,
            batch_size,
            idle_interval: DEFAULT_IDLE_INTERVAL,
            running: Arc::new(AtomicBool::new(false)),
            metrics: LithiumMetrics,
        }
    }

    /// Override the idle interval between plan cycles once the destination
    /// cursor has caught up to the source tip. Exposed for tests; the CLI
    /// does not vary it from the default.
    pub fn with_idle_interval(mut self, interval: Duration) -> Self {
        self.idle_interval = interval;
        self
    }

    /// Drive the relay until `stop()` is called or a fatal error occurs.
    /// A second concurrent call fails `AlreadyRunning`.
    pub async fn run(&self) -> Result<(), LithiumError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(LithiumError::AlreadyRunning);
        }

        let result = self.run_loop().await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    /// Cooperatively stop the loop; observed at the top of the next
    /// iteration and immediately before submission. A no-op if already
    /// stopped.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn run_loop(&self) -> Result<(), LithiumError> {
        while self.is_running() {
            match self.plan_and_submit().await {
                Ok(Progress::Idle) => {
                    tokio::time::sleep(self.idle_interval).await;
                }
                Ok(Progress::Submitted) => {}
                Err(err) if err.is_transient() => {
                    self.metrics.record_transient_error();
                    warn!(error = %err, "transient error, replanning");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// One plan cycle: read cursor/tip, and if there is a gap, fetch and
    /// submit the next contiguous range.
    #[instrument(skip(self), fields(batch_size = self.batch_size))]
    async fn plan_and_submit(&self) -> Result<Progress, LithiumError> {
        let start = std::time::Instant::now();

        let synched = self.contract_dest.get_height().await?;
        let tip = self.rpc_source.block_number().await?;

        if synched >= tip {
            return Ok(Progress::Idle);
        }

        let from_height = synched + 1;
        let to_height = tip.min(synched + self.batch_size as u64);

        info!(from_height, to_height, "fetching batch");
        let mut blocks = Vec::with_capacity((to_height - from_height + 1) as usize);
        for height in from_height..=to_height {
            let (block, tx_count, log_count) = process_block(&self.rpc_source, height).await?;
            self.metrics.record_block_relayed();
            self.metrics
                .record_leaves_relayed((tx_count + log_count) as u64);
            blocks.push(block);
        }

        // Re-check cooperative cancellation immediately before submitting:
        // the fetch loop above may have taken a while.
        if !self.is_running() {
            return Ok(Progress::Idle);
        }

        self.submit(synched, &blocks).await?;
        self.metrics
            .record_batch_latency(start.elapsed().as_secs_f64());
        Ok(Progress::Submitted)
    }

    async fn submit(&self, prev_height: u64, blocks: &[Block]) -> Result<(), LithiumError> {
        let actual_prev = self.contract_dest.get_height().await?;
        if actual_prev != prev_height {
            return Err(LithiumError::HeightRace);
        }

        let flat_pairs = flatten(blocks);
        let last = blocks
            .last()
            .expect("fetch always produces at least one block for a non-empty range");

        let pending = self.contract_dest.update(prev_height, flat_pairs).await?;
        let receipt = pending.wait().await?;
        if receipt.status == 0 {
            self.metrics.record_submission_failure();
            return Err(LithiumError::Submission(format!(
                "Update({prev_height}) rejected on-chain"
            )));
        }

        let new_height = self.contract_dest.get_height().await?;
        if new_height != last.height {
            self.metrics.record_submission_failure();
            return Err(LithiumError::Consistency(format!(
                "expected destination height {}, got {new_height}",
                last.height
            )));
        }
        let new_root = self.contract_dest.get_merkle_root(last.height).await?;
        if new_root != last.root {
            self.metrics.record_submission_failure();
            return Err(LithiumError::Consistency(format!(
                "expected root {:?} at height {}, got {new_root:?}",
                last.root, last.height
            )));
        }

        Ok(())
    }
}

/// `[root_0, hash_0, root_1, hash_1, ...]` in ascending height order. An
/// empty block still contributes a `(root = 0, hash)` pair.
fn flatten(blocks: &[Block]) -> Vec<B256> {
    blocks.iter().flat_map(|b| [b.root, b.hash]).collect()
}

enum Progress {
    Idle,
    Submitted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{PendingUpdate, RpcBlock, RpcReceipt, RpcTransaction, UpdateReceipt};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeRpc {
        tip: u64,
        blocks: HashMap<u64, RpcBlock>,
    }

    #[async_trait]
    impl ChainRpc for FakeRpc {
        async fn block_number(&self) -> Result<u64, LithiumError> {
            Ok(self.tip)
        }

        async fn get_block_by_number(&self, height: u64) -> Result<Option<RpcBlock>, LithiumError> {
            Ok(self.blocks.get(&height).cloned().or_else(|| {
                (height <= self.tip).then(|| RpcBlock {
                    hash: hash(height as u8),
                    transactions: vec![],
                })
            }))
        }

        async fn get_transaction_by_hash(
            &self,
            _hash: B256,
        ) -> Result<Option<RpcTransaction>, LithiumError> {
            Ok(None)
        }

        async fn get_transaction_receipt(
            &self,
            _hash: B256,
        ) -> Result<Option<RpcReceipt>, LithiumError> {
            Ok(None)
        }
    }

    fn hash(byte: u8) -> B256 {
        let mut b = [0u8; 32];
        b[31] = byte;
        B256::from(b)
    }

    struct ImmediateUpdate(UpdateReceipt);

    #[async_trait]
    impl PendingUpdate for ImmediateUpdate {
        async fn wait(self: Box<Self>) -> Result<UpdateReceipt, LithiumError> {
            Ok(self.0)
        }
    }

    struct FakeContract {
        height: Mutex<u64>,
        roots: Mutex<HashMap<u64, B256>>,
        prev_heights_seen: Mutex<Vec<u64>>,
        reject: bool,
    }

    impl FakeContract {
        fn new(start_height: u64) -> Self {
            Self {
                height: Mutex::new(start_height),
                roots: Mutex::new(HashMap::new()),
                prev_heights_seen: Mutex::new(Vec::new()),
                reject: false,
            }
        }
    }

    #[async_trait]
    impl DestinationContract for FakeContract {
        async fn get_height(&self) -> Result<u64, LithiumError> {
            Ok(*self.height.lock().unwrap())
        }

        async fn get_merkle_root(&self, height: u64) -> Result<B256, LithiumError> {
            Ok(*self.roots.lock().unwrap().get(&height).unwrap_or(&B256::ZERO))
        }

        async fn update(
            &self,
            prev_height: u64,
            flat_pairs: Vec<B256>,
        ) -> Result<Box<dyn PendingUpdate>, LithiumError> {
            self.prev_heights_seen.lock().unwrap().push(prev_height);
            if self.reject {
                return Ok(Box::new(ImmediateUpdate(UpdateReceipt { status: 0 })));
            }
            let mut height = self.height.lock().unwrap();
            let mut roots = self.roots.lock().unwrap();
            let mut h = prev_height;
            for pair in flat_pairs.chunks_exact(2) {
                h += 1;
                roots.insert(h, pair[0]);
            }
            *height = h;
            Ok(Box::new(ImmediateUpdate(UpdateReceipt { status: 1 })))
        }
    }

    #[tokio::test]
    async fn cold_start_submits_exact_batch_boundaries() {
        // S4: destination height H, source tip H + 2*batch_size + 3 ->
        // three Update calls with prev_height = H, H+batch_size, H+2*batch_size.
        let batch_size = 4u32;
        let start_height = 100u64;
        let tip = start_height + 2 * batch_size as u64 + 3;

        let rpc = FakeRpc {
            tip,
            blocks: HashMap::new(),
        };
        let contract = FakeContract::new(start_height);
        let relay = Lithium::new(rpc, contract, batch_size);
        relay.running.store(true, Ordering::SeqCst);

        relay.plan_and_submit().await.unwrap();
        relay.plan_and_submit().await.unwrap();
        relay.plan_and_submit().await.unwrap();

        let seen = relay.contract_dest.prev_heights_seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                start_height,
                start_height + batch_size as u64,
                start_height + 2 * batch_size as u64,
            ]
        );
    }

    #[tokio::test]
    async fn rejected_update_surfaces_submission_error() {
        let rpc = FakeRpc {
            tip: 5,
            blocks: HashMap::new(),
        };
        let mut contract = FakeContract::new(0);
        contract.reject = true;
        let relay = Lithium::new(rpc, contract, 10);
        relay.running.store(true, Ordering::SeqCst);

        let err = relay.plan_and_submit().await.unwrap_err();
        assert!(matches!(err, LithiumError::Submission(_)));
        assert_eq!(relay.contract_dest.get_height().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn height_race_is_detected_before_submit() {
        let rpc = FakeRpc {
            tip: 5,
            blocks: HashMap::new(),
        };
        let contract = FakeContract::new(0);
        let relay = Lithium::new(rpc, contract, 10);

        // Simulate a concurrent writer advancing the cursor between plan's
        // read and submit's pre-check by bumping height directly.
        *relay.contract_dest.height.lock().unwrap() = 1;

        let err = relay.submit(0, &[]).await.unwrap_err();
        assert!(matches!(err, LithiumError::HeightRace));
    }

    #[tokio::test]
    async fn s6_concurrent_writer_mid_plan_resumes_without_gaps() {
        let rpc = FakeRpc {
            tip: 20,
            blocks: HashMap::new(),
        };
        let contract = FakeContract::new(0);
        let relay = Lithium::new(rpc, contract, 3);
        relay.running.store(true, Ordering::SeqCst);

        relay.plan_and_submit().await.unwrap(); // submits heights 1..=3

        // A concurrent external writer (another relay instance, an operator
        // intervention) advances the cursor past where this relay left off.
        *relay.contract_dest.height.lock().unwrap() = 6;

        // The next plan re-reads the cursor fresh and resumes from height 7,
        // not from its own stale view of height 3.
        relay.plan_and_submit().await.unwrap();
        let seen = relay.contract_dest.prev_heights_seen.lock().unwrap().clone();
        assert_eq!(seen, vec![0, 6]);
        assert_eq!(relay.contract_dest.get_height().await.unwrap(), 9);
    }

    #[tokio::test]
    async fn idle_when_cursor_matches_tip() {
        let rpc = FakeRpc {
            tip: 3,
            blocks: HashMap::new(),
        };
        let contract = FakeContract::new(3);
        let relay = Lithium::new(rpc, contract, 10);

        assert!(matches!(
            relay.plan_and_submit().await.unwrap(),
            Progress::Idle
        ));
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let rpc = FakeRpc {
            tip: 0,
            blocks: HashMap::new(),
        };
        let contract = FakeContract::new(0);
        let relay = Lithium::new(rpc, contract, 1);
        relay.stop();
        relay.stop();
        assert!(!relay.is_running());
    }

    #[tokio::test]
    async fn second_concurrent_run_fails_already_running() {
        let rpc = FakeRpc {
            tip: 0,
            blocks: HashMap::new(),
        };
        let contract = FakeContract::new(0);
        let relay = Lithium::new(rpc, contract, 1).with_idle_interval(Duration::from_millis(10));

        relay.running.store(true, Ordering::SeqCst);
        let err = relay.run().await.unwrap_err();
        assert!(matches!(err, LithiumError::AlreadyRunning));
    }
}
