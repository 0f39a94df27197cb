use async_trait::async_trait;
use solr_sync_protocol::{Document, FailureDetail, Selection};

/// Location of one page in the content source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub batch: u64,
    pub batch_size: usize,
    pub offset: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Document>,
    /// Set when the source knows nothing follows this page.
    pub is_last: bool,
}

/// Paginated content store the indexer reads from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn count_eligible(&self, selection: &Selection) -> Result<u64, FailureDetail>;

    async fn fetch_page(
        &self,
        selection: &Selection,
        request: &PageRequest,
    ) -> Result<Page, FailureDetail>;
}

/// Write side of the search index.
#[async_trait]
pub trait IndexWriter: Send + Sync {
    async fn write(&self, document: &Document) -> Result<(), FailureDetail>;

    async fn delete(&self, id: &str) -> Result<(), FailureDetail>;

    /// Removes every document in one request. Must succeed on an empty index.
    async fn delete_all(&self) -> Result<(), FailureDetail>;
}
