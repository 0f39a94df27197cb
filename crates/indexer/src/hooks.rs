use crate::stats::{BatchProgress, Counters, ItemOutcome, RunReport};
use async_trait::async_trait;
use solr_sync_protocol::FailureDetail;

/// Receives progress while a run is in flight.
pub trait IndexObserver: Send {
    /// Called once per processed item, after the counters were updated.
    fn on_item(&mut self, _outcome: &ItemOutcome, _counters: &Counters) {}

    /// Called exactly once per batch boundary.
    fn on_batch(&mut self, _progress: &BatchProgress) {}
}

impl IndexObserver for () {}

/// Notified once after a run processed every eligible item (e.g. commit or cache invalidation).
#[async_trait]
pub trait CompletionHook: Send + Sync {
    fn name(&self) -> &str;

    async fn index_completed(&self, report: &RunReport) -> Result<(), FailureDetail>;
}
