use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::time::interval;

use crate::args::PositiveU64;
use crate::shutdown::{ShutdownReceiver, ShutdownSender};

/// Shared permit budget for all workers.
///
/// A refill task adds one permit per tick at `1/rate` cadence, measured from
/// limiter start (missed ticks catch up, so consumer stalls do not skew the
/// long-run rate). Outstanding permits are capped at one second's budget: a
/// stalled pool can never bank a burst above `rate`. Permits are consumed on
/// acquisition, never returned.
#[derive(Clone)]
pub struct RateLimiter {
    permits: Arc<Semaphore>,
}

impl RateLimiter {
    /// Start the limiter and its refill task. The task stops and closes the
    /// permit source when the shutdown signal fires, which releases every
    /// worker still waiting on [`RateLimiter::acquire`].
    #[must_use]
    pub fn start(rate: PositiveU64, shutdown_tx: &ShutdownSender) -> Self {
        let permits = Arc::new(Semaphore::new(0));
        spawn_refill_task(Arc::clone(&permits), rate, shutdown_tx.subscribe());
        Self { permits }
    }

    #[cfg(test)]
    pub(crate) fn with_permits(permits: Arc<Semaphore>) -> Self {
        Self { permits }
    }

    /// Wait for the next permit and consume it. Delivery is competitive:
    /// whichever caller is ready first wins, with no fairness guarantee.
    ///
    /// Returns `None` once the limiter has shut down.
    pub async fn acquire(&self) -> Option<()> {
        match self.permits.acquire().await {
            Ok(permit) => {
                permit.forget();
                Some(())
            }
            Err(_closed) => None,
        }
    }

    #[must_use]
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

fn spawn_refill_task(permits: Arc<Semaphore>, rate: PositiveU64, mut shutdown_rx: ShutdownReceiver) {
    tokio::spawn(async move {
        let cap = usize::try_from(rate.get()).unwrap_or(usize::MAX);
        let mut refill_tick = interval(tick_period(rate.get()));
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = refill_tick.tick() => {
                    refill_step(&permits, cap);
                }
            }
        }
        permits.close();
    });
}

/// Add one permit unless a full second's budget is already outstanding.
pub(super) fn refill_step(permits: &Semaphore, cap: usize) {
    if permits.available_permits() < cap {
        permits.add_permits(1);
    }
}

/// Tick spacing for a given rate, clamped away from zero for rates beyond
/// nanosecond resolution.
pub(super) fn tick_period(rate: u64) -> Duration {
    let divisor = u32::try_from(rate).unwrap_or(u32::MAX).max(1);
    let period = Duration::from_secs(1)
        .checked_div(divisor)
        .unwrap_or(Duration::ZERO);
    if period.is_zero() {
        Duration::from_nanos(1)
    } else {
        period
    }
}
