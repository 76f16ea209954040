use std::collections::BTreeMap;
use std::time::Duration;

/// Error class for a failed request attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailureKind {
    Timeout,
    Connect,
    Transport,
}

impl FailureKind {
    #[must_use]
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            FailureKind::Timeout
        } else if err.is_connect() {
            FailureKind::Connect
        } else {
            FailureKind::Transport
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Connect => "connect error",
            FailureKind::Transport => "transport error",
        }
    }
}

/// Result of one request attempt. Produced exactly once per attempt by a
/// worker; ownership moves through the result channel to the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Status(u16),
    Failed(FailureKind),
}

/// Tally key: an exact status code, or one of the failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Bucket {
    Status(u16),
    Failure(FailureKind),
}

impl Bucket {
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Bucket::Status(code) => code.to_string(),
            Bucket::Failure(kind) => kind.as_str().to_owned(),
        }
    }
}

impl From<Outcome> for Bucket {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Status(code) => Bucket::Status(code),
            Outcome::Failed(kind) => Bucket::Failure(kind),
        }
    }
}

/// Counts per bucket plus a running total, scoped to one reporting window or
/// to the whole run. Mutated only by the aggregator task.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusTally {
    counts: BTreeMap<Bucket, u64>,
    total: u64,
}

impl StatusTally {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
            total: 0,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        let slot = self.counts.entry(Bucket::from(outcome)).or_insert(0);
        *slot = slot.saturating_add(1);
        self.total = self.total.saturating_add(1);
    }

    pub fn merge(&mut self, other: &StatusTally) {
        for (bucket, count) in &other.counts {
            let slot = self.counts.entry(*bucket).or_insert(0);
            *slot = slot.saturating_add(*count);
        }
        self.total = self.total.saturating_add(other.total);
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    #[must_use]
    pub fn count(&self, bucket: &Bucket) -> u64 {
        self.counts.get(bucket).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Bucket, &u64)> {
        self.counts.iter()
    }

    /// Count of all failure-class entries combined.
    #[must_use]
    pub fn failures(&self) -> u64 {
        self.counts
            .iter()
            .filter(|(bucket, _)| matches!(bucket, Bucket::Failure(_)))
            .fold(0u64, |acc, (_, count)| acc.saturating_add(*count))
    }
}

/// Final result of a run, returned by the aggregator after its last drain.
#[derive(Debug, Clone)]
pub struct TallyReport {
    pub duration: Duration,
    pub windows: u64,
    pub cumulative: StatusTally,
    /// Outcomes discarded because the result channel was full.
    pub dropped: u64,
}
