use anyhow::Result;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay before the n-th retry (1-based): 2^n seconds, so 2s, 4s, 8s.
pub fn backoff_delay(retry: u32) -> Duration {
    Duration::from_secs(1u64 << retry)
}

/// Exponential-backoff wrapper over a fallible async operation. Any failure
/// is retryable at this layer; after the last attempt the original error
/// propagates. Stateless and shareable across concurrent invocations.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: DEFAULT_MAX_RETRIES }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retry = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    retry += 1;
                    if retry > self.max_retries {
                        return Err(err);
                    }
                    let delay = backoff_delay(retry);
                    tracing::warn!(
                        "attempt {} failed ({}), retrying in {:?}",
                        retry,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
