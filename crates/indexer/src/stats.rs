use serde::Serialize;
use solr_sync_protocol::FailureDetail;
use std::time::Duration;

/// Running tallies of an index run.
///
/// `success + failed + remaining == total` holds after every update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub success: u64,
    pub failed: u64,
    pub remaining: u64,
    pub total: u64,
}

impl Counters {
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            success: 0,
            failed: 0,
            remaining: total,
            total,
        }
    }

    #[must_use]
    pub fn attempted(&self) -> u64 {
        self.success + self.failed
    }

    pub fn record_success(&mut self) {
        self.success += 1;
        self.settle();
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
        self.settle();
    }

    /// Sets `total` to the number of attempted items once the source is exhausted.
    ///
    /// Returns the previous total when it differed.
    pub fn reconcile(&mut self) -> Option<u64> {
        let attempted = self.attempted();
        if attempted == self.total {
            return None;
        }
        let previous = self.total;
        self.total = attempted;
        self.remaining = 0;
        Some(previous)
    }

    fn settle(&mut self) {
        let attempted = self.attempted();
        if attempted > self.total {
            self.total = attempted;
        }
        self.remaining = self.total - attempted;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Success,
    Failed,
}

/// Result of submitting one content item to the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub id: String,
    pub title: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<FailureDetail>,
}

impl ItemOutcome {
    pub(crate) fn success(id: String, title: String) -> Self {
        Self {
            id,
            title,
            status: ItemStatus::Success,
            message: None,
        }
    }

    pub(crate) fn failed(id: String, title: String, detail: FailureDetail) -> Self {
        Self {
            id,
            title,
            status: ItemStatus::Failed,
            message: Some(detail),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ItemStatus::Success
    }
}

/// State exposed once per batch boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub batch: u64,
    pub total_batches: u64,
    pub items_in_batch: usize,
    pub counters: Counters,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// The run stopped early; the counters are the last known state.
    Aborted(FailureDetail),
}

/// Final state of an index run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub counters: Counters,
    pub status: RunStatus,
    pub start_batch: u64,
    pub batches_processed: u64,
    /// Items that belong to batches before `start_batch`.
    pub skipped: u64,
    pub elapsed: Duration,
    pub hook_failures: Vec<FailureDetail>,
    /// Set when a completed run could not remove its checkpoint; a later resume would skip work.
    pub stale_checkpoint: Option<String>,
}

impl RunReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Completed
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.counters.failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn balanced(c: &Counters) -> bool {
        c.success + c.failed + c.remaining == c.total
    }

    #[test]
    fn counters_stay_balanced() {
        let mut counters = Counters::new(3);
        assert!(balanced(&counters));

        counters.record_success();
        counters.record_failure();
        assert_eq!(
            counters,
            Counters {
                success: 1,
                failed: 1,
                remaining: 1,
                total: 3
            }
        );
        assert!(balanced(&counters));
    }

    #[test]
    fn total_grows_when_source_yields_more_than_counted() {
        let mut counters = Counters::new(1);
        counters.record_success();
        counters.record_success();
        assert_eq!(counters.total, 2);
        assert_eq!(counters.remaining, 0);
        assert!(balanced(&counters));
    }

    #[test]
    fn reconcile_shrinks_total_to_attempted() {
        let mut counters = Counters::new(5);
        counters.record_success();
        counters.record_failure();

        assert_eq!(counters.reconcile(), Some(5));
        assert_eq!(counters.total, 2);
        assert_eq!(counters.remaining, 0);
        assert!(balanced(&counters));

        assert_eq!(counters.reconcile(), None);
    }
}
