mod error;
pub mod explain;
mod flatten;
mod query;
pub mod solr;

pub use error::{Result, SearchError};
pub use explain::{render, render_report};
pub use flatten::{flatten, render_json_lines, FlatRecord, MULTI_VALUE_SEPARATOR};
pub use query::{run_debug, run_select, DebugOutcome, QueryBackend, SelectOutcome, MATCH_ALL};
pub use solr::{decode_debug, decode_select};
