use crate::error::{IndexerError, Result};
use crate::source::PageRequest;

/// Position of an index run within the paginated content source.
///
/// Pure state: the cursor never performs I/O. The indexer reports each fetched page through
/// [`BatchCursor::record_page`], which drives [`BatchCursor::has_more`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchCursor {
    batch_size: usize,
    current_batch: u64,
    total_items: u64,
    started: bool,
    exhausted: bool,
}

impl BatchCursor {
    pub fn new(batch_size: usize, total_items: u64) -> Result<Self> {
        if batch_size == 0 {
            return Err(IndexerError::InvalidBatchSize(batch_size));
        }
        Ok(Self {
            batch_size,
            current_batch: 0,
            total_items,
            started: false,
            exhausted: false,
        })
    }

    /// Sets the first batch to fetch. Only valid before the first page was recorded.
    pub fn seed(&mut self, batch: u64) -> Result<()> {
        if self.started {
            return Err(IndexerError::CursorStarted(self.current_batch));
        }
        self.current_batch = batch;
        Ok(())
    }

    pub fn advance(&mut self) {
        self.current_batch += 1;
    }

    /// Feeds the result of the last fetch. A short, empty or explicitly final page ends the run.
    pub fn record_page(&mut self, len: usize, is_last: bool) {
        self.started = true;
        self.exhausted = is_last || len < self.batch_size;
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    #[must_use]
    pub fn current_batch(&self) -> u64 {
        self.current_batch
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.current_batch.saturating_mul(self.batch_size as u64)
    }

    /// Batches needed to cover every eligible item, including seeded-over batches.
    #[must_use]
    pub fn total_batches(&self) -> u64 {
        self.total_items.div_ceil(self.batch_size as u64)
    }

    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            batch: self.current_batch,
            batch_size: self.batch_size,
            offset: self.offset(),
        }
    }
}
