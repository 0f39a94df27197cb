use solr_sync_protocol::FailureDetail;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Backend error {code}: {message}")]
    Backend { code: u16, message: String },
}

impl From<SearchError> for FailureDetail {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Backend { code, message } => {
                FailureDetail::rejected(message).with_cause(format!("status {code}"))
            }
            other => FailureDetail::malformed(other.to_string()),
        }
    }
}
