use crate::command::domain::{CommandOutcome, DebugPayload, Reporter};
use solr_sync_search::{run_debug, DebugOutcome, QueryBackend};

pub async fn run(
    backend: &dyn QueryBackend,
    payload: &DebugPayload,
    reporter: &mut Reporter,
) -> CommandOutcome {
    let outcomes = run_debug(backend, &payload.queries).await;

    let mut failed = 0usize;
    let mut fatal = false;
    let mut printed_any = false;
    for (query, outcome) in &outcomes {
        match outcome {
            DebugOutcome::Report(lines) => {
                if printed_any {
                    reporter.line("");
                }
                printed_any = true;
                for line in lines {
                    reporter.line(line);
                }
            }
            DebugOutcome::Failed(detail) => {
                failed += 1;
                fatal |= detail.is_fatal();
                reporter.warning(&format!("Debug query `{query}` failed: {detail}"));
            }
        }
    }

    let total = outcomes.len();
    if fatal {
        CommandOutcome::fatal(format!("{failed} of {total} debug queries failed; index unreachable"))
    } else if failed > 0 {
        CommandOutcome::item_failures(format!("{failed} of {total} debug queries failed"))
    } else {
        CommandOutcome::success(format!("Explained {total} queries"))
    }
}
