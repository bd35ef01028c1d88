//! Retry for transient SQLite lock contention
//!
//! Parallel extractions for different books each hold their own write
//! transaction. When SQLite reports the database busy or locked beyond its
//! own busy timeout, the whole transactional operation is re-run with
//! exponential backoff (10 ms doubling to 1 s) until `max_wait_ms` elapses.

use mta_common::{Error, Result};
use std::future::Future;
use std::time::{Duration, Instant};

const INITIAL_BACKOFF_MS: u64 = 10;
const MAX_BACKOFF_MS: u64 = 1000;

/// Run `operation`, retrying while it fails with a lock error
///
/// Non-lock errors are returned immediately. `operation` must be safe to
/// re-run, which holds for a rolled-back transaction.
pub async fn retry_on_lock<F, Fut, T>(operation_name: &str, max_wait_ms: u64, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let max_wait = Duration::from_millis(max_wait_ms);
    let mut backoff_ms = INITIAL_BACKOFF_MS;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let err = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Database operation succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(err) if err.is_lock_contention() => err,
            Err(err) => return Err(err),
        };

        let elapsed = start.elapsed();
        if elapsed >= max_wait {
            tracing::error!(
                operation = operation_name,
                attempt,
                elapsed_ms = elapsed.as_millis() as u64,
                max_wait_ms,
                error = %err,
                "Database still locked, giving up"
            );
            return Err(Error::LockTimeout {
                operation: operation_name.to_string(),
                attempts: attempt,
                elapsed_ms: elapsed.as_millis() as u64,
            });
        }

        tracing::warn!(
            operation = operation_name,
            attempt,
            backoff_ms,
            "Database locked, retrying"
        );
        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_success_needs_one_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry_on_lock("op", 100, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(7)
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_on_lock("op", 1000, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::InvalidInput("bad".to_string()))
        })
        .await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
