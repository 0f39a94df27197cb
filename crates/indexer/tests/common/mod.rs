//! In-memory collaborators for indexer tests.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use solr_sync_indexer::{
    BatchProgress, CompletionHook, ContentSource, Counters, IndexObserver, IndexWriter,
    ItemOutcome, Page, PageRequest, RunReport,
};
use solr_sync_protocol::{Document, FailureDetail, Selection};
use std::collections::{BTreeSet, HashSet};
use std::sync::Mutex;

pub fn post(id: u64, post_type: &str) -> Document {
    Document::from_value(json!({
        "id": id,
        "title": format!("Post {id}"),
        "post_type": post_type,
    }))
    .unwrap()
}

pub fn posts(count: u64) -> Vec<Document> {
    (1..=count).map(|id| post(id, "post")).collect()
}

/// Serves pages from a vector. Can be told to fail a given batch or to miscount.
#[derive(Default)]
pub struct VecSource {
    pub items: Vec<Document>,
    pub fail_batch: Option<u64>,
    pub count_override: Option<u64>,
    pub fail_count: bool,
    pub fetched: Mutex<Vec<PageRequest>>,
}

impl VecSource {
    pub fn new(items: Vec<Document>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn fetched_batches(&self) -> Vec<u64> {
        self.fetched.lock().unwrap().iter().map(|r| r.batch).collect()
    }

    fn eligible(&self, selection: &Selection) -> Vec<&Document> {
        self.items.iter().filter(|d| selection.matches(d)).collect()
    }
}

#[async_trait]
impl ContentSource for VecSource {
    async fn count_eligible(&self, selection: &Selection) -> Result<u64, FailureDetail> {
        if self.fail_count {
            return Err(FailureDetail::connectivity("content store offline"));
        }
        Ok(self
            .count_override
            .unwrap_or(self.eligible(selection).len() as u64))
    }

    async fn fetch_page(
        &self,
        selection: &Selection,
        request: &PageRequest,
    ) -> Result<Page, FailureDetail> {
        self.fetched.lock().unwrap().push(*request);
        if self.fail_batch == Some(request.batch) {
            return Err(FailureDetail::io("page read failed").with_cause("disk error"));
        }
        let eligible = self.eligible(selection);
        let start = (request.offset as usize).min(eligible.len());
        let end = (start + request.batch_size).min(eligible.len());
        Ok(Page {
            items: eligible[start..end].iter().map(|d| (*d).clone()).collect(),
            is_last: end >= eligible.len(),
        })
    }
}

/// Records writes and deletes; rejects configured ids.
#[derive(Default)]
pub struct RecordingWriter {
    pub reject: HashSet<String>,
    pub unreachable_on: Option<String>,
    pub written: Mutex<Vec<String>>,
    pub stored: Mutex<BTreeSet<String>>,
    pub delete_all_calls: Mutex<usize>,
}

impl RecordingWriter {
    pub fn rejecting(ids: &[&str]) -> Self {
        Self {
            reject: ids.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn with_stored(ids: &[&str]) -> Self {
        let writer = Self::default();
        writer
            .stored
            .lock()
            .unwrap()
            .extend(ids.iter().map(|s| s.to_string()));
        writer
    }

    pub fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl IndexWriter for RecordingWriter {
    async fn write(&self, document: &Document) -> Result<(), FailureDetail> {
        let id = document.id().unwrap_or_default();
        if self.unreachable_on.as_deref() == Some(id.as_str()) {
            return Err(FailureDetail::connectivity("index unreachable"));
        }
        if self.reject.contains(&id) {
            return Err(FailureDetail::rejected(format!("document {id} rejected")));
        }
        self.written.lock().unwrap().push(id.clone());
        self.stored.lock().unwrap().insert(id);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), FailureDetail> {
        if self.reject.contains(id) {
            return Err(FailureDetail::not_found(format!("no document {id}")));
        }
        self.stored.lock().unwrap().remove(id);
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), FailureDetail> {
        *self.delete_all_calls.lock().unwrap() += 1;
        self.stored.lock().unwrap().clear();
        Ok(())
    }
}

/// Collects every observer callback.
#[derive(Default)]
pub struct Recorder {
    pub items: Vec<(ItemOutcome, Counters)>,
    pub batches: Vec<BatchProgress>,
}

impl IndexObserver for Recorder {
    fn on_item(&mut self, outcome: &ItemOutcome, counters: &Counters) {
        self.items.push((outcome.clone(), *counters));
    }

    fn on_batch(&mut self, progress: &BatchProgress) {
        self.batches.push(progress.clone());
    }
}

#[derive(Default)]
pub struct CountingHook {
    pub calls: Mutex<Vec<Counters>>,
    pub fail: bool,
}

impl CountingHook {
    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionHook for CountingHook {
    fn name(&self) -> &str {
        "counting"
    }

    async fn index_completed(&self, report: &RunReport) -> Result<(), FailureDetail> {
        self.calls.lock().unwrap().push(report.counters);
        if self.fail {
            return Err(FailureDetail::connectivity("cache endpoint down"));
        }
        Ok(())
    }
}
