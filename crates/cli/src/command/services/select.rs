use crate::command::domain::{CommandOutcome, Reporter, SelectPayload};
use anyhow::Result;
use solr_sync_search::{run_select, QueryBackend, SelectOutcome};

/// Prints every record as one JSON line; counts and empty results go to stderr.
pub async fn run(
    backend: &dyn QueryBackend,
    payload: &SelectPayload,
    reporter: &mut Reporter,
) -> Result<CommandOutcome> {
    let outcomes = run_select(backend, &payload.queries, payload.rows).await;

    let mut records_printed = 0usize;
    let mut failed = 0usize;
    let mut fatal = false;
    for (query, outcome) in &outcomes {
        match outcome {
            SelectOutcome::Found { num_found, records } => {
                for record in records {
                    reporter.line(&record.to_json_line()?);
                }
                records_printed += records.len();
                reporter.note(&format!(
                    "{num_found} matches for `{query}`, {} shown",
                    records.len()
                ));
            }
            SelectOutcome::Empty => reporter.notice(&format!("No matches for `{query}`")),
            SelectOutcome::Failed(detail) => {
                failed += 1;
                fatal |= detail.is_fatal();
                reporter.warning(&format!("Query `{query}` failed: {detail}"));
            }
        }
    }

    let total = outcomes.len();
    Ok(if fatal {
        CommandOutcome::fatal(format!("{failed} of {total} queries failed; index unreachable"))
    } else if failed > 0 {
        CommandOutcome::item_failures(format!("{failed} of {total} queries failed"))
    } else {
        CommandOutcome::success(format!(
            "{total} queries, {records_printed} records"
        ))
    })
}
