//! Bounded retry with exponential backoff for network calls.
//!
//! [`RetryPolicy`] wraps any fallible async operation. Failed attempts are logged
//! and followed by a sleep; once the attempt budget is spent the last error is
//! handed back to the caller unchanged.
//!
//! # Backoff Strategy
//!
//! The delay after attempt `n` (1-based) follows:
//! ```text
//! delay = min(clamp(multiplier * 2^(n-1), min_delay, max_delay) + random_jitter(0..=jitter), max_delay)
//! ```
//! With the defaults (3 attempts, multiplier 1s, min 4s, max 10s) a call that
//! keeps failing waits 4s, 4s and then gives up. No single wait exceeds
//! `max_delay`, jitter included.
//!
//! [`RetryPolicy::run_when`] takes a predicate that marks which errors are worth
//! another attempt; any other error is returned at once.

use rand::{Rng, rng};
use std::fmt;
use std::future::Future;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, warn};

/// Reusable retry settings shared by the listing and content fetchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Scale of the exponential term.
    pub multiplier: StdDuration,
    /// Lower bound on any single delay.
    pub min_delay: StdDuration,
    /// Upper bound on any single delay, jitter included.
    pub max_delay: StdDuration,
    /// Upper bound of the random jitter added to every delay.
    pub jitter: StdDuration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: StdDuration::from_secs(1),
            min_delay: StdDuration::from_secs(4),
            max_delay: StdDuration::from_secs(10),
            jitter: StdDuration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// A policy that retries `max_attempts` times without sleeping.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            multiplier: StdDuration::ZERO,
            min_delay: StdDuration::ZERO,
            max_delay: StdDuration::ZERO,
            jitter: StdDuration::ZERO,
        }
    }

    /// Delay before the attempt that follows failed attempt `attempt` (1-based), without jitter.
    pub fn delay_for(&self, attempt: u32) -> StdDuration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.multiplier
            .saturating_mul(factor)
            .clamp(self.min_delay, self.max_delay.max(self.min_delay))
    }

    /// Delay actually slept after failed attempt `attempt`: the schedule plus
    /// jitter, capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> StdDuration {
        let cap = self.max_delay.max(self.min_delay);
        (self.delay_for(attempt) + self.jitter_sample()).min(cap)
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// `label` names the call in log lines. The error of the final attempt is
    /// returned as-is.
    pub async fn run<T, E, F, Fut>(&self, label: &str, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.run_when(label, op, |_| true).await
    }

    /// Like [`run`](Self::run), but only errors for which `retryable` holds get
    /// another attempt.
    pub async fn run_when<T, E, F, Fut, P>(
        &self,
        label: &str,
        mut op: F,
        retryable: P,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
        P: Fn(&E) -> bool,
    {
        let total_t0 = Instant::now();
        let max = self.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            let attempt_t0 = Instant::now();
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    attempt += 1;
                    let elapsed_ms_attempt = attempt_t0.elapsed().as_millis();
                    let elapsed_ms_total = total_t0.elapsed().as_millis();

                    if !retryable(&e) {
                        error!(
                            %label,
                            attempt,
                            elapsed_ms_total,
                            error = %e,
                            "non-retryable failure"
                        );
                        return Err(e);
                    }

                    if attempt >= max {
                        error!(
                            %label,
                            attempt,
                            max,
                            elapsed_ms_attempt,
                            elapsed_ms_total,
                            error = %e,
                            "retries exhausted"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        %label,
                        attempt,
                        max,
                        elapsed_ms_attempt,
                        elapsed_ms_total,
                        ?delay,
                        error = %e,
                        "attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    fn jitter_sample(&self) -> StdDuration {
        let max_ms = self.jitter.as_millis() as u64;
        if max_ms == 0 {
            return StdDuration::ZERO;
        }
        StdDuration::from_millis(rng().random_range(0..=max_ms))
    }
}
