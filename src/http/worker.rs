use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::error;

use crate::config::RunConfig;
use crate::error::AppResult;
use crate::metrics::Outcome;
use crate::shutdown::ShutdownSender;

use super::rate::RateLimiter;
use super::request::{build_request_template, send_request};

/// Spawn the worker pool.
///
/// Each worker loops: observe shutdown or win the next permit, perform one
/// request, push exactly one outcome. Requests within one worker are strictly
/// sequential. By default a request in flight at shutdown is abandoned;
/// `wait_ongoing` lets it finish first.
///
/// # Errors
///
/// Returns an error when a worker's request template cannot be built.
pub fn spawn_workers(
    config: &Arc<RunConfig>,
    client: &Client,
    limiter: &RateLimiter,
    shutdown_tx: &ShutdownSender,
    results_tx: &mpsc::Sender<Outcome>,
    dropped: &Arc<AtomicU64>,
) -> AppResult<Vec<JoinHandle<()>>> {
    let count = config.concurrency.get();
    let mut handles = Vec::with_capacity(count);

    for _ in 0..count {
        let template = build_request_template(client, config)?;
        let client = client.clone();
        let limiter = limiter.clone();
        // Subscribed before the task is scheduled so a deadline firing right
        // after spawn is never missed.
        let mut shutdown_rx = shutdown_tx.subscribe();
        let results_tx = results_tx.clone();
        let dropped = Arc::clone(dropped);
        let wait_ongoing = config.wait_ongoing;

        let handle = tokio::spawn(async move {
            loop {
                let permit = tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => None,
                    permit = limiter.acquire() => permit,
                };
                if permit.is_none() {
                    break;
                }

                let outcome = if wait_ongoing {
                    send_request(&client, &template).await
                } else {
                    tokio::select! {
                        _ = shutdown_rx.recv() => break,
                        outcome = send_request(&client, &template) => outcome,
                    }
                };

                if !push_outcome(&results_tx, outcome, &dropped) {
                    break;
                }
            }
        });

        handles.push(handle);
    }

    Ok(handles)
}

/// Push one outcome without ever blocking the worker. A full channel drops
/// the outcome and counts it; a closed channel is a coordinator bug and ends
/// the loop.
///
/// Returns `false` when the worker should stop.
pub(crate) fn push_outcome(
    results_tx: &mpsc::Sender<Outcome>,
    outcome: Outcome,
    dropped: &AtomicU64,
) -> bool {
    match results_tx.try_send(outcome) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            dropped.fetch_add(1, Ordering::Relaxed);
            true
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            error!("Result channel closed before workers exited; dropping outcome.");
            false
        }
    }
}
