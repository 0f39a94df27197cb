use serde::{Deserialize, Serialize};

/// One node of a scoring explanation tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainNode {
    pub value: f64,
    #[serde(rename = "match")]
    pub matched: bool,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExplainNode>,
}

impl ExplainNode {
    pub fn new(value: f64, matched: bool, description: impl Into<String>) -> Self {
        Self {
            value,
            matched,
            description: description.into(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<ExplainNode>) -> Self {
        self.children = children;
        self
    }

    /// Depth of the deepest leaf, counting this node as 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ExplainNode::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Elapsed time per component within one debug phase (`prepare`, `process`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimings {
    pub name: String,
    /// Components in backend order.
    pub components: Vec<(String, f64)>,
}

/// Debug output for a single query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DebugReport {
    pub query_string: String,
    pub parsed_query: String,
    pub query_parser: String,
    pub other_query: String,
    /// Document key to explanation, in backend order.
    pub explain: Vec<(String, ExplainNode)>,
    pub explain_other: Vec<(String, ExplainNode)>,
    pub total_time_ms: f64,
    pub phases: Vec<PhaseTimings>,
}
