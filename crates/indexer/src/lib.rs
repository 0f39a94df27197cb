//! # Solr Sync Indexer
//!
//! Resumable, batch-oriented reindexing of a paginated content source.
//!
//! ## Pipeline
//!
//! ```text
//! ContentSource
//!     │
//!     ├──> count_eligible(selection)      ─> Counters.total
//!     │
//!     ├──> fetch_page(batch k, k+1, ...)  ─> one page in memory
//!     │      └─> IndexWriter::write(item) ─> ItemOutcome + Counters
//!     │
//!     ├──> batch boundary                 ─> BatchProgress, checkpoint
//!     │
//!     └──> exhausted                      ─> CompletionHook (once)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use solr_sync_indexer::{BatchIndexer, ContentSource, IndexWriter};
//! use solr_sync_protocol::Selection;
//!
//! async fn reindex(source: &dyn ContentSource, writer: &dyn IndexWriter) -> anyhow::Result<()> {
//!     let indexer = BatchIndexer::new(source, writer, 100)?;
//!     let report = indexer.run(&Selection::all(), 0, &mut ()).await?;
//!
//!     println!("Indexed {} of {}", report.counters.success, report.counters.total);
//!     Ok(())
//! }
//! ```

mod checkpoint;
mod cursor;
mod delete;
mod error;
mod hooks;
mod indexer;
mod source;
mod stats;

pub use checkpoint::{Checkpoint, CheckpointStore, FileCheckpointStore};
pub use cursor::BatchCursor;
pub use delete::{delete_all, delete_ids, DeleteOutcome};
pub use error::{IndexerError, Result};
pub use hooks::{CompletionHook, IndexObserver};
pub use indexer::{BatchIndexer, DEFAULT_BATCH_SIZE};
pub use source::{ContentSource, IndexWriter, Page, PageRequest};
pub use stats::{BatchProgress, Counters, ItemOutcome, ItemStatus, RunReport, RunStatus};
