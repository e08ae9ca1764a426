// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded retry with exponential backoff.
//!
//! [`retry_async`] and [`retry_blocking`] re-invoke an operation while a
//! caller-supplied classifier reports its failure as transient, up to
//! [`RetryPolicy::max_attempts`] attempts in total. The delay after failed
//! attempt `n` is `unit * backoff_base^(n-1)`; the first attempt runs
//! immediately. Non-transient failures propagate without retry, and once
//! attempts are exhausted the last failure is returned.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, warn};

const DEFAULT_BACKOFF_BASE: f64 = 2.0;

/// Attempt bound and backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: f64,
    unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: DEFAULT_BACKOFF_BASE,
            unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with a one-second backoff unit.
    ///
    /// `max_attempts` is clamped to at least 1. A `backoff_base` that would
    /// not grow the delay (non-finite or `<= 1.0`) falls back to 2.0.
    pub fn new(max_attempts: u32, backoff_base: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base: if backoff_base.is_finite() && backoff_base > 1.0 {
                backoff_base
            } else {
                DEFAULT_BACKOFF_BASE
            },
            unit: Duration::from_secs(1),
        }
    }

    /// Replaces the backoff unit (the delay after the first failure).
    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff_base(&self) -> f64 {
        self.backoff_base
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        self.unit.mul_f64(self.backoff_base.powi(exponent))
    }
}

/// Runs `op` under `policy`, suspending between attempts.
pub async fn retry_async<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    operation_name: &str,
    is_transient: C,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(operation = operation_name, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if !is_transient(&err) {
                    return Err(err);
                }
                if attempt >= policy.max_attempts {
                    error!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %err,
                        "giving up after transient failures"
                    );
                    return Err(err);
                }
                let delay = policy.delay_after(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient failure, will retry"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Runs `op` under `policy`, blocking the current thread between attempts.
///
/// Must not be called from inside an async task.
pub fn retry_blocking<T, E, F, C>(
    policy: &RetryPolicy,
    operation_name: &str,
    is_transient: C,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    C: Fn(&E) -> bool,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_transient(&err) {
                    return Err(err);
                }
                if attempt >= policy.max_attempts {
                    error!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %err,
                        "giving up after transient failures"
                    );
                    return Err(err);
                }
                let delay = policy.delay_after(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient failure, will retry"
                );
                std::thread::sleep(delay);
                attempt += 1;
            }
        }
    }
}
