use crate::explain::render_report;
use crate::flatten::{flatten, FlatRecord};
use async_trait::async_trait;
use solr_sync_protocol::{DebugReport, FailureDetail, ResultSet};

/// Query string matching every document.
pub const MATCH_ALL: &str = "*:*";

/// Read side of the search index.
///
/// `Ok(None)` means the backend answered without a usable result.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    async fn query(&self, query: &str, rows: usize) -> Result<Option<ResultSet>, FailureDetail>;

    async fn debug_query(&self, query: &str) -> Result<Option<DebugReport>, FailureDetail>;
}

/// Result of one select query.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome {
    Found {
        num_found: u64,
        records: Vec<FlatRecord>,
    },
    /// Zero hits.
    Empty,
    Failed(FailureDetail),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DebugOutcome {
    Report(Vec<String>),
    Failed(FailureDetail),
}

/// Run each query in order. A failed query never stops the ones after it.
pub async fn run_select<S: AsRef<str>>(
    backend: &dyn QueryBackend,
    queries: &[S],
    rows: usize,
) -> Vec<(String, SelectOutcome)> {
    let mut outcomes = Vec::with_capacity(queries.len());
    for query in queries {
        let query = query.as_ref();
        let outcome = match backend.query(query, rows).await {
            Ok(Some(set)) if set.is_empty() => SelectOutcome::Empty,
            Ok(Some(set)) => SelectOutcome::Found {
                num_found: set.num_found,
                records: set.docs.iter().map(flatten).collect(),
            },
            Ok(None) => SelectOutcome::Failed(FailureDetail::malformed(format!(
                "no result for query `{query}`"
            ))),
            Err(detail) => SelectOutcome::Failed(detail),
        };
        log::debug!("select `{query}` -> {outcome:?}");
        outcomes.push((query.to_string(), outcome));
    }
    outcomes
}

/// Fetch and render debug output for each query in order.
pub async fn run_debug<S: AsRef<str>>(
    backend: &dyn QueryBackend,
    queries: &[S],
) -> Vec<(String, DebugOutcome)> {
    let mut outcomes = Vec::with_capacity(queries.len());
    for query in queries {
        let query = query.as_ref();
        let outcome = match backend.debug_query(query).await {
            Ok(Some(report)) => DebugOutcome::Report(render_report(&report)),
            Ok(None) => DebugOutcome::Failed(FailureDetail::malformed(format!(
                "no debug output for query `{query}`"
            ))),
            Err(detail) => DebugOutcome::Failed(detail),
        };
        outcomes.push((query.to_string(), outcome));
    }
    outcomes
}
