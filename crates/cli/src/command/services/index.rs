use crate::command::domain::{CommandOutcome, IndexPayload, Reporter};
use anyhow::Result;
use solr_sync_indexer::{
    BatchIndexer, BatchProgress, CheckpointStore, CompletionHook, ContentSource, Counters,
    IndexObserver, IndexWriter, IndexerError, ItemOutcome, RunReport, RunStatus,
};
use solr_sync_protocol::Selection;

/// Collaborators for one `index` invocation.
pub struct IndexRun<'a> {
    pub source: &'a dyn ContentSource,
    pub writer: &'a dyn IndexWriter,
    pub hooks: Vec<&'a dyn CompletionHook>,
    pub checkpoint: Option<&'a dyn CheckpointStore>,
    pub batch_size: usize,
}

pub async fn run(
    collaborators: IndexRun<'_>,
    payload: &IndexPayload,
    reporter: &mut Reporter,
) -> Result<CommandOutcome> {
    let selection = Selection {
        post_type: payload.post_type.clone(),
    };
    let start_batch = match payload.batch {
        Some(batch) => batch,
        None => resume_point(collaborators.checkpoint, &selection, collaborators.batch_size).await,
    };
    if start_batch > 0 {
        reporter.note(&format!("Resuming from batch {start_batch}"));
    }

    let mut indexer = BatchIndexer::new(
        collaborators.source,
        collaborators.writer,
        collaborators.batch_size,
    )?;
    for hook in collaborators.hooks {
        indexer = indexer.with_completion_hook(hook);
    }
    if let Some(store) = collaborators.checkpoint {
        indexer = indexer.with_checkpoint(store);
    }

    let mut printer = ProgressPrinter {
        reporter: &mut *reporter,
    };
    let report = match indexer.run(&selection, start_batch, &mut printer).await {
        Ok(report) => report,
        Err(IndexerError::Source(detail)) => {
            return Ok(CommandOutcome::fatal(format!(
                "Cannot read content source: {detail}"
            )))
        }
        Err(err) => return Err(err.into()),
    };

    for failure in &report.hook_failures {
        reporter.warning(&format!("Post-index step failed: {failure}"));
    }
    if let Some(err) = &report.stale_checkpoint {
        reporter.warning(&format!(
            "Could not remove the checkpoint ({err}); the next run resumes from it unless --batch is given"
        ));
    }
    Ok(summarize(&report))
}

async fn resume_point(
    store: Option<&dyn CheckpointStore>,
    selection: &Selection,
    batch_size: usize,
) -> u64 {
    let Some(store) = store else {
        return 0;
    };
    match store.load().await {
        Ok(Some(checkpoint)) => checkpoint
            .resume_batch_for(selection, batch_size)
            .unwrap_or_else(|| {
                log::info!("checkpoint was written for another selection or batch size; starting over");
                0
            }),
        Ok(None) => 0,
        Err(err) => {
            log::warn!("ignoring unreadable checkpoint: {err}");
            0
        }
    }
}

fn summarize(report: &RunReport) -> CommandOutcome {
    let Counters {
        success,
        failed,
        total,
        ..
    } = report.counters;
    let indexed = format!("Indexed {success} of {total}");
    match &report.status {
        RunStatus::Aborted(detail) => {
            CommandOutcome::fatal(format!("Run aborted: {detail}. {indexed}"))
        }
        RunStatus::Completed if failed > 0 => {
            CommandOutcome::item_failures(format!("{indexed} ({failed} failed)"))
        }
        RunStatus::Completed => CommandOutcome::success(indexed),
    }
}

/// Renders indexer callbacks: one line per item, one per batch boundary.
struct ProgressPrinter<'r> {
    reporter: &'r mut Reporter,
}

impl IndexObserver for ProgressPrinter<'_> {
    fn on_item(&mut self, outcome: &ItemOutcome, counters: &Counters) {
        match &outcome.message {
            None => self.reporter.progress(&format!(
                "Indexed {} \"{}\" ({}/{})",
                outcome.id,
                outcome.title,
                counters.attempted(),
                counters.total
            )),
            Some(detail) => self.reporter.warning(&format!(
                "Failed to index {} \"{}\": {detail}",
                display_id(&outcome.id),
                outcome.title
            )),
        }
    }

    fn on_batch(&mut self, progress: &BatchProgress) {
        self.reporter.progress(&format!(
            "Batch {} done ({}/{}): {} indexed, {} failed, {} remaining, {:.1}s elapsed",
            progress.batch,
            progress.batch + 1,
            progress.total_batches,
            progress.counters.success,
            progress.counters.failed,
            progress.counters.remaining,
            progress.elapsed.as_secs_f64()
        ));
    }
}

fn display_id(id: &str) -> &str {
    if id.trim().is_empty() {
        "<no id>"
    } else {
        id
    }
}
