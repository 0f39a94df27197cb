use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::cursor::BatchCursor;
use crate::error::{IndexerError, Result};
use crate::hooks::{CompletionHook, IndexObserver};
use crate::source::{ContentSource, IndexWriter};
use crate::stats::{BatchProgress, Counters, ItemOutcome, RunReport, RunStatus};
use solr_sync_protocol::{Document, FailureDetail, Selection};
use std::time::Instant;

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Drives a [`BatchCursor`] over a [`ContentSource`] and submits every item to an [`IndexWriter`].
///
/// Items are written one at a time, in page order; only the current page is held in memory.
/// The indexer keeps no state between runs: the resume point is the `start_batch` argument, and
/// persisting it is left to an optional [`CheckpointStore`].
pub struct BatchIndexer<'a> {
    source: &'a dyn ContentSource,
    writer: &'a dyn IndexWriter,
    batch_size: usize,
    hooks: Vec<&'a dyn CompletionHook>,
    checkpoint: Option<&'a dyn CheckpointStore>,
}

impl<'a> BatchIndexer<'a> {
    pub fn new(
        source: &'a dyn ContentSource,
        writer: &'a dyn IndexWriter,
        batch_size: usize,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(IndexerError::InvalidBatchSize(batch_size));
        }
        Ok(Self {
            source,
            writer,
            batch_size,
            hooks: Vec::new(),
            checkpoint: None,
        })
    }

    #[must_use]
    pub fn with_completion_hook(mut self, hook: &'a dyn CompletionHook) -> Self {
        self.hooks.push(hook);
        self
    }

    #[must_use]
    pub fn with_checkpoint(mut self, store: &'a dyn CheckpointStore) -> Self {
        self.checkpoint = Some(store);
        self
    }

    /// Index every eligible item from `start_batch` onwards.
    ///
    /// Counting failures are returned as [`IndexerError::Source`] before any work starts.
    /// A page fetch failure, or a write failure that means the index is unreachable, ends the
    /// run with [`RunStatus::Aborted`] and the counters gathered so far.
    pub async fn run(
        &self,
        selection: &Selection,
        start_batch: u64,
        observer: &mut dyn IndexObserver,
    ) -> Result<RunReport> {
        let started = Instant::now();

        let eligible = self
            .source
            .count_eligible(selection)
            .await
            .map_err(IndexerError::Source)?;

        let mut cursor = BatchCursor::new(self.batch_size, eligible)?;
        cursor.seed(start_batch)?;
        let skipped = eligible.min(cursor.offset());
        let mut counters = Counters::new(eligible - skipped);
        let mut batches_processed = 0u64;

        log::info!(
            "Indexing {} of {eligible} eligible items from batch {start_batch} (batch size {})",
            counters.total,
            self.batch_size
        );

        loop {
            let request = cursor.page_request();
            let page = match self.source.fetch_page(selection, &request).await {
                Ok(page) => page,
                Err(detail) => {
                    log::warn!("Failed to fetch batch {}: {detail}", request.batch);
                    return Ok(RunReport {
                        counters,
                        status: RunStatus::Aborted(detail),
                        start_batch,
                        batches_processed,
                        skipped,
                        elapsed: started.elapsed(),
                        hook_failures: Vec::new(),
                        stale_checkpoint: None,
                    });
                }
            };
            cursor.record_page(page.items.len(), page.is_last);

            if page.items.is_empty() {
                break;
            }

            let items_in_batch = page.items.len();
            for item in page.items {
                let id = item.id().unwrap_or_default();
                let title = item.title();

                let outcome = match self.write_item(&id, &item).await {
                    Ok(()) => {
                        counters.record_success();
                        log::debug!("Indexed {id}");
                        ItemOutcome::success(id, title)
                    }
                    Err(detail) if detail.is_fatal() => {
                        log::warn!("Index unavailable while writing {id}: {detail}");
                        return Ok(RunReport {
                            counters,
                            status: RunStatus::Aborted(detail),
                            start_batch,
                            batches_processed,
                            skipped,
                            elapsed: started.elapsed(),
                            hook_failures: Vec::new(),
                            stale_checkpoint: None,
                        });
                    }
                    Err(detail) => {
                        counters.record_failure();
                        log::debug!("Failed to index {id}: {detail}");
                        ItemOutcome::failed(id, title, detail)
                    }
                };
                observer.on_item(&outcome, &counters);
            }

            batches_processed += 1;
            observer.on_batch(&BatchProgress {
                batch: cursor.current_batch(),
                total_batches: cursor.total_batches(),
                items_in_batch,
                counters,
                elapsed: started.elapsed(),
            });
            self.save_checkpoint(selection, cursor.current_batch() + 1)
                .await;

            if !cursor.has_more() {
                break;
            }
            cursor.advance();
        }

        if let Some(expected) = counters.reconcile() {
            log::warn!(
                "Content source yielded {} items but {expected} were counted; total adjusted",
                counters.total
            );
        }

        let mut report = RunReport {
            counters,
            status: RunStatus::Completed,
            start_batch,
            batches_processed,
            skipped,
            elapsed: started.elapsed(),
            hook_failures: Vec::new(),
            stale_checkpoint: None,
        };

        for hook in &self.hooks {
            if let Err(detail) = hook.index_completed(&report).await {
                log::warn!("Completion hook '{}' failed: {detail}", hook.name());
                report.hook_failures.push(detail);
            }
        }
        report.stale_checkpoint = self.clear_checkpoint().await;

        log::info!(
            "Indexing completed: {} indexed, {} failed in {:?}",
            report.counters.success,
            report.counters.failed,
            report.elapsed
        );
        Ok(report)
    }

    async fn write_item(&self, id: &str, item: &Document) -> std::result::Result<(), FailureDetail> {
        if id.trim().is_empty() {
            return Err(FailureDetail::invalid("document has no id"));
        }
        self.writer.write(item).await
    }

    async fn save_checkpoint(&self, selection: &Selection, next_batch: u64) {
        let Some(store) = self.checkpoint else {
            return;
        };
        let checkpoint = Checkpoint::new(next_batch, self.batch_size, selection.clone());
        if let Err(err) = store.save(&checkpoint).await {
            log::warn!("Failed to save checkpoint at batch {next_batch}: {err}");
        }
    }

    async fn clear_checkpoint(&self) -> Option<String> {
        let store = self.checkpoint?;
        match store.clear().await {
            Ok(()) => None,
            Err(err) => {
                log::warn!("Failed to clear checkpoint: {err}");
                Some(err.to_string())
            }
        }
    }
}
