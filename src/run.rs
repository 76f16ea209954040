//! Run coordination: deadline ownership, task spawning, and orderly shutdown.
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::args::{OutputFormat, PositiveU64};
use crate::config::RunConfig;
use crate::error::AppResult;
use crate::http::{RateLimiter, build_client, spawn_workers};
use crate::metrics::{Outcome, TallyReport, setup_tally_collector};
use crate::shutdown;

/// Floor for the result channel capacity.
const RESULT_CHANNEL_MIN_CAPACITY: usize = 100;

/// Ceiling for the result channel capacity, so extreme rates stay bounded.
const RESULT_CHANNEL_MAX_CAPACITY: usize = 1 << 20;

/// Slack granted beyond the deadline for workers to observe cancellation.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Execute one load-test run to completion.
///
/// Starts the aggregator, the rate limiter, and the worker pool; sleeps to
/// the deadline; broadcasts the one-shot cancellation; joins every worker
/// under a bounded grace period (aborting stragglers); closes the result
/// channel only once no worker can push again; and finally awaits the
/// aggregator's drained report. Individual request failures never abort the
/// run.
///
/// # Errors
///
/// Returns an error when the client or a request template cannot be built,
/// or if the aggregator task fails to join.
pub async fn execute(config: &Arc<RunConfig>) -> AppResult<TallyReport> {
    let client = build_client(config)?;

    let (shutdown_tx, _shutdown_rx) = shutdown::channel();
    let (results_tx, results_rx) = mpsc::channel::<Outcome>(result_channel_capacity(config.rate));
    let dropped = Arc::new(AtomicU64::new(0));
    let run_start = Instant::now();

    let render_windows = matches!(config.output_format, OutputFormat::Text);
    let collector = setup_tally_collector(
        &shutdown_tx,
        results_rx,
        Arc::clone(&dropped),
        render_windows,
        run_start,
    );

    let limiter = RateLimiter::start(config.rate, &shutdown_tx);
    let workers = spawn_workers(config, &client, &limiter, &shutdown_tx, &results_tx, &dropped)?;
    info!(
        "Running {} workers at {} req/s against {} for {:?}.",
        config.concurrency.get(),
        config.rate.get(),
        config.url,
        config.duration
    );

    tokio::time::sleep(config.duration).await;
    debug!("Deadline reached; signalling shutdown.");
    drop(shutdown_tx.send(()));

    let grace = if config.wait_ongoing {
        config.request_timeout.saturating_add(SHUTDOWN_GRACE)
    } else {
        SHUTDOWN_GRACE
    };
    let join_deadline = Instant::now()
        .checked_add(grace)
        .unwrap_or_else(Instant::now);
    for mut handle in workers {
        match tokio::time::timeout_at(join_deadline, &mut handle).await {
            Ok(join_result) => {
                if let Err(err) = join_result {
                    warn!("Worker task failed: {}", err);
                }
            }
            Err(_elapsed) => {
                warn!("Worker did not exit within the grace period; aborting.");
                handle.abort();
            }
        }
    }

    // Every worker sender is gone; dropping ours closes the channel and lets
    // the aggregator finish its final drain.
    drop(results_tx);

    let report = collector.await?;
    Ok(report)
}

/// Size the result channel to absorb one reporting period at the configured
/// rate, with a floor for small rates and a ceiling for extreme ones.
fn result_channel_capacity(rate: PositiveU64) -> usize {
    usize::try_from(rate.get().saturating_mul(2))
        .unwrap_or(RESULT_CHANNEL_MAX_CAPACITY)
        .clamp(RESULT_CHANNEL_MIN_CAPACITY, RESULT_CHANNEL_MAX_CAPACITY)
}
