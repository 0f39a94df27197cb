use crate::config::SyncConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use solr_sync_indexer::{CompletionHook, IndexWriter, RunReport};
use solr_sync_protocol::{DebugReport, Document, FailureDetail, FailureKind, ResultSet};
use solr_sync_search::{decode_debug, decode_select, QueryBackend};
use std::time::Duration;

/// Rows returned with a debug query; explanations are only produced for returned documents.
const DEBUG_ROWS: usize = 10;

/// HTTP client for one Solr core.
#[derive(Clone)]
pub struct SolrClient {
    http: Client,
    base_url: String,
    core: String,
    commit_within_ms: Option<u64>,
}

impl SolrClient {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: config.solr_url.trim_end_matches('/').to_string(),
            core: config.core.clone(),
            commit_within_ms: config.commit_within_ms,
        })
    }

    pub fn core(&self) -> &str {
        &self.core
    }

    fn core_url(&self, handler: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.core, handler)
    }

    /// Ping the core; a non-OK answer counts as unreachable.
    pub async fn ping(&self) -> Result<Value, FailureDetail> {
        let body = self
            .send(
                self.http
                    .get(self.core_url("admin/ping"))
                    .query(&[("wt", "json")]),
            )
            .await
            .map_err(unusable)?;
        let value = parse_body(&body)?;
        match value.get("status").and_then(Value::as_str) {
            Some("OK") => Ok(value),
            other => Err(FailureDetail::connectivity(format!(
                "core `{}` answered ping with status {}",
                self.core,
                other.unwrap_or("unknown")
            ))),
        }
    }

    /// Core admin status for this core.
    pub async fn status(&self) -> Result<Value, FailureDetail> {
        let body = self
            .send(
                self.http
                    .get(format!("{}/admin/cores", self.base_url))
                    .query(&[("action", "STATUS"), ("core", self.core.as_str()), ("wt", "json")]),
            )
            .await
            .map_err(unusable)?;
        let value = parse_body(&body)?;
        Ok(value
            .get("status")
            .and_then(|status| status.get(&self.core))
            .cloned()
            .unwrap_or(value))
    }

    pub async fn commit(&self) -> Result<(), FailureDetail> {
        self.update(json!({"commit": {}}), false).await
    }

    pub async fn optimize(&self) -> Result<(), FailureDetail> {
        self.update(json!({"optimize": {}}), false).await
    }

    async fn update(&self, body: Value, commit_within: bool) -> Result<(), FailureDetail> {
        let mut request = self
            .http
            .post(self.core_url("update"))
            .query(&[("wt", "json")])
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string());
        if commit_within {
            if let Some(ms) = self.commit_within_ms {
                request = request.query(&[("commitWithin", ms)]);
            }
        }
        self.send(request).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, FailureDetail> {
        let response = request.send().await.map_err(transport_failure)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_failure)?;
        if status.is_success() {
            return Ok(body);
        }
        Err(status_failure(status, &body))
    }

    async fn select(&self, params: &[(&str, String)]) -> Result<String, FailureDetail> {
        self.send(
            self.http
                .get(self.core_url("select"))
                .query(&[("wt", "json")])
                .query(params),
        )
        .await
    }
}

#[async_trait]
impl IndexWriter for SolrClient {
    async fn write(&self, document: &Document) -> Result<(), FailureDetail> {
        self.update(json!([document]), true).await
    }

    async fn delete(&self, id: &str) -> Result<(), FailureDetail> {
        self.update(json!({"delete": {"id": id}}), true).await
    }

    async fn delete_all(&self) -> Result<(), FailureDetail> {
        self.update(json!({"delete": {"query": "*:*"}, "commit": {}}), false)
            .await
    }
}

#[async_trait]
impl QueryBackend for SolrClient {
    async fn query(&self, query: &str, rows: usize) -> Result<Option<ResultSet>, FailureDetail> {
        let body = self
            .select(&[("q", query.to_string()), ("rows", rows.to_string())])
            .await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        decode_select(&body).map(Some).map_err(Into::into)
    }

    async fn debug_query(&self, query: &str) -> Result<Option<DebugReport>, FailureDetail> {
        let body = self
            .select(&[
                ("q", query.to_string()),
                ("rows", DEBUG_ROWS.to_string()),
                ("debugQuery", "true".to_string()),
                ("debug.explain.structured", "true".to_string()),
            ])
            .await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        decode_debug(&body).map(Some).map_err(Into::into)
    }
}

/// Commits pending updates once an index run has processed every item.
pub struct CommitOnComplete<'a> {
    client: &'a SolrClient,
}

impl<'a> CommitOnComplete<'a> {
    pub fn new(client: &'a SolrClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<'a> CompletionHook for CommitOnComplete<'a> {
    fn name(&self) -> &str {
        "commit"
    }

    async fn index_completed(&self, report: &RunReport) -> Result<(), FailureDetail> {
        log::info!(
            "committing core {} after {} indexed items",
            self.client.core(),
            report.counters.success
        );
        self.client.commit().await
    }
}

fn parse_body(body: &str) -> Result<Value, FailureDetail> {
    serde_json::from_str(body)
        .map_err(|err| FailureDetail::malformed("response is not valid JSON").with_cause(err))
}

fn transport_failure(err: reqwest::Error) -> FailureDetail {
    if err.is_connect() || err.is_timeout() {
        FailureDetail::connectivity("Solr is unreachable").with_cause(err)
    } else if err.is_decode() || err.is_body() {
        FailureDetail::malformed("could not read Solr response").with_cause(err)
    } else {
        FailureDetail::io("request to Solr failed").with_cause(err)
    }
}

/// Maps a non-2xx answer. A missing core or handler means the index is unusable.
fn status_failure(status: StatusCode, body: &str) -> FailureDetail {
    let message = solr_error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    });
    let kind = match status {
        StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            FailureKind::Connectivity
        }
        StatusCode::SERVICE_UNAVAILABLE => FailureKind::Connectivity,
        _ => FailureKind::Rejected,
    };
    FailureDetail::new(kind, message).with_cause(format!("HTTP {}", status.as_u16()))
}

fn solr_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("msg")?
        .as_str()
        .map(str::to_string)
}

/// Ping and status are preconditions: any failure there is fatal.
fn unusable(detail: FailureDetail) -> FailureDetail {
    if detail.is_fatal() {
        detail
    } else {
        FailureDetail::connectivity(detail.message.clone())
            .with_cause(detail.cause.unwrap_or_else(|| detail.kind.to_string()))
    }
}
