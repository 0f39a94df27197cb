use crate::command::domain::{CommandOutcome, DeletePayload, Reporter};
use solr_sync_indexer::{delete_all, delete_ids, IndexWriter};

pub async fn run(
    writer: &dyn IndexWriter,
    payload: &DeletePayload,
    reporter: &mut Reporter,
) -> CommandOutcome {
    match payload {
        DeletePayload::All => match delete_all(writer).await {
            Ok(()) => CommandOutcome::success("Deleted all documents"),
            Err(detail) => CommandOutcome::fatal(format!("Failed to delete all documents: {detail}")),
        },
        DeletePayload::Ids(ids) => {
            let outcomes = delete_ids(writer, ids).await;
            let mut deleted = 0usize;
            let mut fatal = false;
            for outcome in &outcomes {
                match &outcome.error {
                    None => {
                        deleted += 1;
                        reporter.progress(&format!("Deleted {}", outcome.id));
                    }
                    Some(detail) => {
                        fatal |= detail.is_fatal();
                        reporter.warning(&format!("Failed to delete {:?}: {detail}", outcome.id));
                    }
                }
            }

            let summary = format!("Deleted {deleted} of {} documents", outcomes.len());
            if fatal {
                CommandOutcome::fatal(summary)
            } else if deleted < outcomes.len() {
                CommandOutcome::item_failures(summary)
            } else {
                CommandOutcome::success(summary)
            }
        }
    }
}
