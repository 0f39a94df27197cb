//! In-memory collaborators for service tests.

use async_trait::async_trait;
use serde_json::json;
use solr_sync_indexer::{
    Checkpoint, CheckpointStore, ContentSource, IndexWriter, Page, PageRequest,
    Result as IndexerResult,
};
use solr_sync_protocol::{DebugReport, Document, FailureDetail, ResultSet, Selection};
use solr_sync_search::QueryBackend;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub fn posts(count: u64) -> Vec<Document> {
    (1..=count)
        .map(|id| {
            Document::from_value(json!({
                "id": id.to_string(),
                "title": format!("Post {id}"),
                "post_type": "post",
            }))
            .unwrap()
        })
        .collect()
}

#[derive(Default)]
pub struct MemorySource {
    pub items: Vec<Document>,
    pub offline: bool,
}

impl MemorySource {
    pub fn new(items: Vec<Document>) -> Self {
        Self {
            items,
            offline: false,
        }
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn count_eligible(&self, selection: &Selection) -> Result<u64, FailureDetail> {
        if self.offline {
            return Err(FailureDetail::connectivity("database offline"));
        }
        Ok(self.items.iter().filter(|d| selection.matches(d)).count() as u64)
    }

    async fn fetch_page(
        &self,
        selection: &Selection,
        request: &PageRequest,
    ) -> Result<Page, FailureDetail> {
        let eligible: Vec<&Document> = self.items.iter().filter(|d| selection.matches(d)).collect();
        let start = (request.offset as usize).min(eligible.len());
        let end = (start + request.batch_size).min(eligible.len());
        Ok(Page {
            items: eligible[start..end].iter().map(|d| (*d).clone()).collect(),
            is_last: end >= eligible.len(),
        })
    }
}

#[derive(Default)]
pub struct MemoryWriter {
    pub reject: HashSet<String>,
    pub unreachable_on: Option<String>,
    pub written: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    pub wiped: Mutex<bool>,
}

impl MemoryWriter {
    pub fn rejecting(ids: &[&str]) -> Self {
        Self {
            reject: ids.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl IndexWriter for MemoryWriter {
    async fn write(&self, document: &Document) -> Result<(), FailureDetail> {
        let id = document.id().unwrap_or_default();
        if self.unreachable_on.as_deref() == Some(id.as_str()) {
            return Err(FailureDetail::connectivity("index unreachable"));
        }
        if self.reject.contains(&id) {
            return Err(FailureDetail::rejected(format!("document {id} rejected")));
        }
        self.written.lock().unwrap().push(id);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), FailureDetail> {
        if self.unreachable_on.as_deref() == Some(id) {
            return Err(FailureDetail::connectivity("index unreachable"));
        }
        if self.reject.contains(id) {
            return Err(FailureDetail::not_found(format!("no document {id}")));
        }
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), FailureDetail> {
        if self.unreachable_on.is_some() {
            return Err(FailureDetail::connectivity("index unreachable"));
        }
        *self.wiped.lock().unwrap() = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryCheckpoint {
    saved: Mutex<Option<Checkpoint>>,
    read_only: bool,
}

impl MemoryCheckpoint {
    pub fn at(next_batch: u64, batch_size: usize, selection: Selection) -> Self {
        Self {
            saved: Mutex::new(Some(Checkpoint::new(next_batch, batch_size, selection))),
            read_only: false,
        }
    }

    /// Saves succeed but the checkpoint can never be removed.
    pub fn undeletable(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn current(&self) -> Option<Checkpoint> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpoint {
    async fn load(&self) -> IndexerResult<Option<Checkpoint>> {
        Ok(self.current())
    }

    async fn save(&self, checkpoint: &Checkpoint) -> IndexerResult<()> {
        *self.saved.lock().unwrap() = Some(checkpoint.clone());
        Ok(())
    }

    async fn clear(&self) -> IndexerResult<()> {
        if self.read_only {
            return Err(std::io::Error::other("checkpoint directory is read-only").into());
        }
        *self.saved.lock().unwrap() = None;
        Ok(())
    }
}

/// Answers from fixed maps; unknown queries fail with the configured detail.
#[derive(Default)]
pub struct MemoryBackend {
    pub results: HashMap<String, ResultSet>,
    pub reports: HashMap<String, DebugReport>,
    pub unknown: Option<FailureDetail>,
}

impl MemoryBackend {
    fn unknown(&self, query: &str) -> FailureDetail {
        self.unknown
            .clone()
            .unwrap_or_else(|| FailureDetail::rejected(format!("cannot parse `{query}`")))
    }
}

#[async_trait]
impl QueryBackend for MemoryBackend {
    async fn query(&self, query: &str, rows: usize) -> Result<Option<ResultSet>, FailureDetail> {
        match self.results.get(query) {
            Some(set) => {
                let mut set = set.clone();
                set.docs.truncate(rows);
                Ok(Some(set))
            }
            None => Err(self.unknown(query)),
        }
    }

    async fn debug_query(&self, query: &str) -> Result<Option<DebugReport>, FailureDetail> {
        match self.reports.get(query) {
            Some(report) => Ok(Some(report.clone())),
            None => Err(self.unknown(query)),
        }
    }
}
