use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

use crate::shutdown::ShutdownSender;
use crate::summary::render_window;

use super::{Outcome, StatusTally, TallyReport};

/// Length of one reporting window.
pub const REPORT_PERIOD: Duration = Duration::from_secs(1);

/// Spawn the aggregator task.
///
/// The task wakes only on its reporting timer: each tick performs a
/// non-blocking drain of everything currently buffered, renders the window
/// snapshot, folds it into the cumulative tally, and resets the window. An
/// empty channel yields a zero-total window; the timer never waits on
/// producers.
///
/// Once the shutdown signal fires, the task switches to its final drain: it
/// consumes the channel until the coordinator closes it (which happens only
/// after every worker has exited), so outcomes produced just before shutdown
/// are never lost. The closed channel is the verified-empty stopping
/// condition; no length checks are involved.
#[must_use]
pub fn setup_tally_collector(
    shutdown_tx: &ShutdownSender,
    mut results_rx: mpsc::Receiver<Outcome>,
    dropped: Arc<AtomicU64>,
    render_windows: bool,
    run_start: Instant,
) -> JoinHandle<TallyReport> {
    // Subscribe before the task is scheduled so a shutdown sent immediately
    // after spawning is never missed.
    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::spawn(async move {
        let mut window = StatusTally::new();
        let mut cumulative = StatusTally::new();
        let mut windows: u64 = 0;

        let first_tick = Instant::now()
            .checked_add(REPORT_PERIOD)
            .unwrap_or_else(Instant::now);
        let mut report_tick = interval_at(first_tick, REPORT_PERIOD);
        report_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => break,
                _ = report_tick.tick() => {
                    drain_available(&mut results_rx, &mut window);
                    windows = windows.saturating_add(1);
                    if render_windows {
                        render_window(windows, &window);
                    }
                    cumulative.merge(&window);
                    window = StatusTally::new();
                }
            }
        }

        while let Some(outcome) = results_rx.recv().await {
            window.record(outcome);
        }
        if !window.is_empty() {
            windows = windows.saturating_add(1);
            if render_windows {
                render_window(windows, &window);
            }
            cumulative.merge(&window);
        }

        TallyReport {
            duration: run_start.elapsed(),
            windows,
            cumulative,
            dropped: dropped.load(Ordering::Relaxed),
        }
    })
}

/// Pop everything currently buffered without waiting, tallying each outcome.
/// Returns the number of outcomes drained; zero for an empty channel.
pub fn drain_available(results_rx: &mut mpsc::Receiver<Outcome>, tally: &mut StatusTally) -> u64 {
    let mut drained: u64 = 0;
    loop {
        match results_rx.try_recv() {
            Ok(outcome) => {
                tally.record(outcome);
                drained = drained.saturating_add(1);
            }
            Err(mpsc::error::TryRecvError::Empty | mpsc::error::TryRecvError::Disconnected) => {
                break;
            }
        }
    }
    drained
}
