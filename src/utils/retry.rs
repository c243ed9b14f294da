//! Bounded retry combinator shared by history fetching, model invocation and publishing.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_retry::strategy::jitter;
use tracing::warn;

/// How an error should be treated by a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryClass {
    Terminal,
    Transient,
    /// The platform asked us to back off, optionally for a specific interval.
    Throttled(Option<Duration>),
}

pub trait Retryable {
    fn classify(&self) -> RetryClass;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOn {
    ThrottledOnly,
    TransientOnly,
    TransientOrThrottled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    /// Wait for the platform-specified interval, falling back when none is given.
    Hinted { fallback: Duration, cap: Duration },
    Jittered(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_on: RetryOn,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Never retries.
    #[must_use]
    pub const fn once() -> Self {
        Self {
            max_attempts: 1,
            retry_on: RetryOn::TransientOrThrottled,
            backoff: Backoff::Fixed(Duration::ZERO),
        }
    }

    /// Delay before the next attempt, or `None` when the error should surface.
    #[must_use]
    pub fn delay_for(&self, class: RetryClass, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }

        let hint = match (class, self.retry_on) {
            (RetryClass::Terminal, _)
            | (RetryClass::Transient, RetryOn::ThrottledOnly)
            | (RetryClass::Throttled(_), RetryOn::TransientOnly) => return None,
            (RetryClass::Throttled(hint), _) => hint,
            (RetryClass::Transient, _) => None,
        };

        let delay = match self.backoff {
            Backoff::Fixed(d) => d,
            Backoff::Hinted { fallback, cap } => hint.unwrap_or(fallback).min(cap),
            Backoff::Jittered(base) => jitter(base),
        };
        Some(delay)
    }
}

/// Run `operation` until it succeeds or the policy gives up, returning the last error.
///
/// # Errors
///
/// Returns the error from the final attempt.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                let Some(delay) = policy.delay_for(e.classify(), attempt) else {
                    return Err(e);
                };
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {}ms",
                    label,
                    attempt,
                    policy.max_attempts,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
