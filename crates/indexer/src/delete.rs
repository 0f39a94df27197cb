use crate::source::IndexWriter;
use serde::Serialize;
use solr_sync_protocol::FailureDetail;

/// Result of one delete-by-id attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureDetail>,
}

impl DeleteOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Deletes each id independently; a failure never stops the remaining deletions.
pub async fn delete_ids<S: AsRef<str>>(writer: &dyn IndexWriter, ids: &[S]) -> Vec<DeleteOutcome> {
    let mut outcomes = Vec::with_capacity(ids.len());
    for raw in ids {
        let id = raw.as_ref().trim();
        let error = if id.is_empty() {
            Some(FailureDetail::invalid("empty document id"))
        } else {
            writer.delete(id).await.err()
        };
        if let Some(ref detail) = error {
            log::debug!("Failed to delete {id}: {detail}");
        }
        outcomes.push(DeleteOutcome {
            id: id.to_string(),
            error,
        });
    }
    outcomes
}

/// Clears the whole index with a single request.
pub async fn delete_all(writer: &dyn IndexWriter) -> Result<(), FailureDetail> {
    log::info!("Deleting all documents from the index");
    writer.delete_all().await
}
