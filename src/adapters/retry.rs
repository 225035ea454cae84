//! Bounded retry policy for blocking operations.

use std::time::Duration;
use tracing::warn;

/// Retry policy: attempt count plus a backoff schedule. The schedule is a
/// function of the attempt number, so fixed delay and growing backoff are
/// both one-liners at the call site.
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Box<dyn Fn(u32) -> Duration + Send + Sync>,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        backoff: impl Fn(u32) -> Duration + Send + Sync + 'static,
    ) -> Self {
        assert!(max_attempts >= 1, "at least one attempt is required");
        RetryPolicy {
            max_attempts,
            backoff: Box::new(backoff),
        }
    }

    /// Fixed delay between attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::new(max_attempts, move |_| delay)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op` until it succeeds or attempts are exhausted, sleeping the
    /// backoff duration between attempts. Each failure is logged with its
    /// attempt number; the last error is returned on exhaustion.
    pub fn run<T, E: std::fmt::Display>(
        &self,
        mut op: impl FnMut() -> Result<T, E>,
    ) -> Result<T, E> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(attempt, max_attempts = self.max_attempts, error = %err, "attempt failed");
                    if attempt >= self.max_attempts {
                        return Err(err);
                    }
                }
            }
            std::thread::sleep((self.backoff)(attempt));
            attempt += 1;
        }
    }
}
