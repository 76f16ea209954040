use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};

use super::RateLimiter;
use super::rate::{refill_step, tick_period};
use super::worker::push_outcome;
use crate::args::PositiveU64;
use crate::metrics::Outcome;

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

fn positive_u64(value: u64) -> Result<PositiveU64, String> {
    PositiveU64::try_from(value).map_err(|err| format!("positive u64 failed: {}", err))
}

#[test]
fn tick_period_spaces_permits_by_rate() -> Result<(), String> {
    if tick_period(1) != Duration::from_secs(1) {
        return Err(format!("rate 1 period: {:?}", tick_period(1)));
    }
    if tick_period(10) != Duration::from_millis(100) {
        return Err(format!("rate 10 period: {:?}", tick_period(10)));
    }
    if tick_period(u64::MAX).is_zero() {
        return Err("period must never be zero".to_owned());
    }
    Ok(())
}

#[test]
fn refill_never_exceeds_one_second_budget() -> Result<(), String> {
    let permits = Semaphore::new(0);
    for _ in 0..20 {
        refill_step(&permits, 5);
    }
    if permits.available_permits() != 5 {
        return Err(format!(
            "Expected cap at 5 permits, got {}",
            permits.available_permits()
        ));
    }
    Ok(())
}

#[test]
fn acquire_consumes_permits() -> Result<(), String> {
    run_async_test(async {
        let permits = Arc::new(Semaphore::new(2));
        let limiter = RateLimiter::with_permits(Arc::clone(&permits));

        if limiter.acquire().await.is_none() {
            return Err("Expected first acquire to succeed".to_owned());
        }
        if limiter.acquire().await.is_none() {
            return Err("Expected second acquire to succeed".to_owned());
        }
        if limiter.available() != 0 {
            return Err(format!(
                "Permits must be consumed, {} left",
                limiter.available()
            ));
        }
        Ok(())
    })
}

#[test]
fn closed_limiter_denies_acquire() -> Result<(), String> {
    run_async_test(async {
        let permits = Arc::new(Semaphore::new(0));
        permits.close();
        let limiter = RateLimiter::with_permits(permits);
        if limiter.acquire().await.is_some() {
            return Err("Expected acquire on closed limiter to fail".to_owned());
        }
        Ok(())
    })
}

#[test]
fn shutdown_stops_limiter_after_draining() -> Result<(), String> {
    run_async_test(async {
        let (shutdown_tx, _keep_alive) = crate::shutdown::channel();
        let limiter = RateLimiter::start(positive_u64(1000)?, &shutdown_tx);

        shutdown_tx
            .send(())
            .map_err(|_| "shutdown send failed".to_owned())?;

        // Any permits banked before the signal may still be consumed; the
        // limiter must then report closed rather than park forever.
        let mut consumed: u64 = 0;
        while limiter.acquire().await.is_some() {
            consumed = consumed.saturating_add(1);
            if consumed > 2000 {
                return Err("Limiter kept issuing permits after shutdown".to_owned());
            }
        }
        Ok(())
    })
}

#[test]
fn push_counts_drop_when_channel_is_full() -> Result<(), String> {
    run_async_test(async {
        let (results_tx, mut results_rx) = mpsc::channel::<Outcome>(1);
        let dropped = AtomicU64::new(0);

        if !push_outcome(&results_tx, Outcome::Status(200), &dropped) {
            return Err("Expected first push to succeed".to_owned());
        }
        if !push_outcome(&results_tx, Outcome::Status(200), &dropped) {
            return Err("Full channel must not stop the worker".to_owned());
        }
        if dropped.load(Ordering::Relaxed) != 1 {
            return Err(format!(
                "Expected one counted drop, got {}",
                dropped.load(Ordering::Relaxed)
            ));
        }

        if results_rx.try_recv().is_err() {
            return Err("Expected the first outcome to be delivered".to_owned());
        }
        Ok(())
    })
}

#[test]
fn push_after_close_stops_the_worker() -> Result<(), String> {
    run_async_test(async {
        let (results_tx, results_rx) = mpsc::channel::<Outcome>(1);
        drop(results_rx);
        let dropped = AtomicU64::new(0);

        if push_outcome(&results_tx, Outcome::Status(200), &dropped) {
            return Err("Closed channel must stop the worker".to_owned());
        }
        if dropped.load(Ordering::Relaxed) != 0 {
            return Err("Closed-channel pushes are not counted as drops".to_owned());
        }
        Ok(())
    })
}
