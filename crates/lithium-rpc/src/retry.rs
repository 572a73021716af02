//! Jittered exponential backoff for transient transport errors. Returns
//! `LithiumError` so callers can distinguish transient RPC failures from
//! the rest of the error taxonomy.

use std::time::Duration;

use lithium_core::LithiumError;
use rand::Rng;
use tracing::{debug, warn};

const INITIAL_DELAY_MS: u64 = 100;
const MAX_DELAY_MS: u64 = 30_000;
const MAX_RETRIES: usize = 10;

fn is_transient_error(err: &LithiumError) -> bool {
    let msg = err.to_string().to_lowercase();
    msg.contains("connection")
        || msg.contains("timeout")
        || msg.contains("rate limit")
        || msg.contains("too many requests")
        || msg.contains("429")
        || msg.contains("503")
        || msg.contains("502")
        || msg.contains("504")
        || msg.contains("temporarily unavailable")
        || msg.contains("network")
        || msg.contains("reset by peer")
        || msg.contains("broken pipe")
        || msg.contains("eof")
}

fn compute_delay(attempt: usize) -> Duration {
    let base_delay = INITIAL_DELAY_MS.saturating_mul(1 << attempt.min(10));
    let capped_delay = base_delay.min(MAX_DELAY_MS);
    let jitter = rand::thread_rng().gen_range(0..=capped_delay / 4);
    Duration::from_millis(capped_delay + jitter)
}

pub async fn with_retry<F, Fut, T>(operation_name: &str, mut f: F) -> Result<T, LithiumError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, LithiumError>>,
{
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                if !is_transient_error(&err) {
                    debug!(operation = %operation_name, error = %err, "non-transient error, not retrying");
                    return Err(err);
                }

                if attempt >= MAX_RETRIES {
                    warn!(operation = %operation_name, attempts = %attempt, error = %err, "max retries exceeded");
                    return Err(err);
                }

                let delay = compute_delay(attempt);
                warn!(
                    operation = %operation_name,
                    attempt = %(attempt + 1),
                    max_attempts = %MAX_RETRIES,
                    delay_ms = %delay.as_millis(),
                    error = %err,
                    "transient RPC error, retrying"
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry_on_first_ok() {
        let calls = AtomicUsize::new(0);
        let result: Result<u32, LithiumError> = with_retry("op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_transient_error_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<u32, LithiumError> = with_retry("op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(LithiumError::NotFound("nope".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
