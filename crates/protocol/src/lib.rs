//! # Solr Sync Protocol
//!
//! Data model shared by the indexer, the search formatters and the CLI.
//!
//! - [`Document`]: one content item, an ordered field map
//! - [`Selection`]: which content items an index run covers
//! - [`FailureDetail`]: structured failure value attached to item outcomes and fatal results
//! - [`ResultSet`]: documents returned by a query
//! - [`ExplainNode`] / [`DebugReport`]: debug output of a query

mod document;
mod explain;
mod failure;
mod result_set;

pub use document::{Document, Fields, Selection};
pub use explain::{DebugReport, ExplainNode, PhaseTimings};
pub use failure::{FailureDetail, FailureKind};
pub use result_set::ResultSet;
