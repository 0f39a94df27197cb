mod jsonl;
mod solr;

pub use jsonl::JsonlContentSource;
pub use solr::{CommitOnComplete, SolrClient};
