//! Bounded polling.
//!
//! Every wait evaluates its operation once straight away, then every
//! [`POLL_INTERVAL`] until the budget is spent. Each evaluation yields an
//! [`Attempt`]; ordinary errors count as "not yet", while an error that is
//! itself an exhausted wait stops the loop at once so nested waits never
//! stack their budgets.

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{HarnessError, Result};

pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Outcome of one evaluation inside a wait.
#[derive(Debug)]
pub enum Attempt<T> {
    Ready(T),
    Pending,
    Fatal(HarnessError),
}

impl<T> Attempt<T> {
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(value) => Attempt::Ready(value),
            Err(e) if e.is_timeout() => Attempt::Fatal(e),
            Err(e) => {
                tracing::trace!("Attempt not ready: {}", e);
                Attempt::Pending
            }
        }
    }
}

/// Side effect run when a wait gives up.
#[async_trait]
pub trait FailureCapture: Send + Sync {
    async fn capture(&self);
}

/// Core loop: evaluate `op` until it is ready, fatal, or `budget` elapses.
pub async fn poll<T, F, Fut>(
    budget: Duration,
    capture: Option<&dyn FailureCapture>,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Attempt<T>>,
{
    let started = Instant::now();
    let pause = POLL_INTERVAL.min(budget);
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match op().await {
            Attempt::Ready(value) => {
                if attempts > 1 {
                    tracing::debug!(
                        "Wait satisfied after {} attempts ({:?})",
                        attempts,
                        started.elapsed()
                    );
                }
                return Ok(value);
            }
            Attempt::Fatal(e) => {
                tracing::warn!("Nested wait already failed: {}", e);
                if let Some(capture) = capture {
                    capture.capture().await;
                }
                return Err(e);
            }
            Attempt::Pending => {}
        }

        tokio::time::sleep(pause).await;
        if started.elapsed() >= budget {
            break;
        }
    }

    tracing::warn!(
        "Timed out after {:?} ({} attempts, budget {:?})",
        started.elapsed(),
        attempts,
        budget
    );
    if let Some(capture) = capture {
        capture.capture().await;
    }
    Err(HarnessError::Timeout)
}

/// Wait for `op` to produce a value.
pub async fn until_value<T, F, Fut>(
    budget: Duration,
    capture: Option<&dyn FailureCapture>,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    poll(budget, capture, || {
        let fut = op();
        async move { Attempt::from_result(fut.await) }
    })
    .await
}

/// Wait for `op` to return `true`.
pub async fn until<F, Fut>(
    budget: Duration,
    capture: Option<&dyn FailureCapture>,
    mut op: F,
) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    poll(budget, capture, || {
        let fut = op();
        async move {
            match fut.await {
                Ok(true) => Attempt::Ready(true),
                Ok(false) => Attempt::Pending,
                Err(e) => Attempt::from_result(Err(e)),
            }
        }
    })
    .await
}
