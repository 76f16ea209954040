//! Console rendering for window snapshots and the final report.
//!
//! The aggregator supplies the data (bucket counts and totals); everything
//! about presentation lives here.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::args::OutputFormat;
use crate::error::AppResult;
use crate::metrics::{StatusTally, TallyReport};

pub(crate) fn render_window(index: u64, tally: &StatusTally) {
    println!("--- window {} ---", index);
    for (bucket, count) in tally.iter() {
        println!("{}: {}", bucket.label(), count);
    }
    println!("total: {}", tally.total());
}

#[derive(Debug, Serialize)]
pub struct FinalSummary {
    pub duration_ms: u64,
    pub windows: u64,
    pub total: u64,
    pub failures: u64,
    pub dropped: u64,
    pub buckets: BTreeMap<String, u64>,
}

impl FinalSummary {
    #[must_use]
    pub fn from_report(report: &TallyReport) -> Self {
        let buckets = report
            .cumulative
            .iter()
            .map(|(bucket, count)| (bucket.label(), *count))
            .collect();
        Self {
            duration_ms: u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
            windows: report.windows,
            total: report.cumulative.total(),
            failures: report.cumulative.failures(),
            dropped: report.dropped,
            buckets,
        }
    }
}

/// Print the final cumulative report in the selected format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn print_final(report: &TallyReport, format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Text => {
            println!("--- final ({}s, {} windows) ---", report.duration.as_secs(), report.windows);
            for (bucket, count) in report.cumulative.iter() {
                println!("{}: {}", bucket.label(), count);
            }
            println!("total: {}", report.cumulative.total());
            if report.dropped > 0 {
                println!("dropped: {}", report.dropped);
            }
        }
        OutputFormat::Json => {
            let summary = FinalSummary::from_report(report);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
