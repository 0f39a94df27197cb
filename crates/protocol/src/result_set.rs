use crate::Document;
use serde::{Deserialize, Serialize};

/// Documents matching a query, plus the backend's total hit count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub num_found: u64,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub docs: Vec<Document>,
}

impl ResultSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_found == 0
    }
}
