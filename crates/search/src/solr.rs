//! Decoding of Solr `/select` response bodies.

use crate::error::{Result, SearchError};
use serde_json::{Map, Value};
use solr_sync_protocol::{DebugReport, Document, ExplainNode, PhaseTimings, ResultSet};

/// Decode a `/select` body into a [`ResultSet`]. Documents keep their field order.
pub fn decode_select(body: &str) -> Result<ResultSet> {
    let root = parse_root(body)?;
    let response = root
        .get("response")
        .and_then(Value::as_object)
        .ok_or_else(|| SearchError::Malformed("missing `response` object".to_string()))?;

    let num_found = response
        .get("numFound")
        .and_then(Value::as_u64)
        .ok_or_else(|| SearchError::Malformed("missing `response.numFound`".to_string()))?;
    let start = response.get("start").and_then(Value::as_u64).unwrap_or(0);

    let docs = match response.get("docs") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .cloned()
            .map(|item| {
                Document::from_value(item)
                    .ok_or_else(|| SearchError::Malformed("document is not an object".to_string()))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(SearchError::Malformed(
                "`response.docs` is not an array".to_string(),
            ))
        }
    };

    log::debug!("decoded select response: numFound={num_found} docs={}", docs.len());
    Ok(ResultSet {
        num_found,
        start,
        docs,
    })
}

/// Decode the `debug` section of a `debugQuery=true` response.
///
/// Explanations must be structured (`debug.explain.structured=true`).
pub fn decode_debug(body: &str) -> Result<DebugReport> {
    let root = parse_root(body)?;
    let debug = root
        .get("debug")
        .and_then(Value::as_object)
        .ok_or_else(|| SearchError::Malformed("missing `debug` object".to_string()))?;

    let (total_time_ms, phases) = match debug.get("timing").and_then(Value::as_object) {
        Some(timing) => decode_timing(timing),
        None => (0.0, Vec::new()),
    };

    Ok(DebugReport {
        query_string: text_field(debug, "querystring"),
        parsed_query: text_field(debug, "parsedquery"),
        query_parser: text_field(debug, "QParser"),
        other_query: text_field(debug, "otherQuery"),
        explain: decode_explain_map(debug.get("explain"))?,
        explain_other: decode_explain_map(debug.get("explainOther"))?,
        total_time_ms,
        phases,
    })
}

fn parse_root(body: &str) -> Result<Map<String, Value>> {
    let root: Value = serde_json::from_str(body)?;
    let Value::Object(root) = root else {
        return Err(SearchError::Malformed(
            "response body is not a JSON object".to_string(),
        ));
    };
    if let Some(error) = root.get("error") {
        let message = error
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        let code = error
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(500);
        return Err(SearchError::Backend { code, message });
    }
    Ok(root)
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn decode_explain_map(value: Option<&Value>) -> Result<Vec<(String, ExplainNode)>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let map = value
        .as_object()
        .ok_or_else(|| SearchError::Malformed("explain section is not an object".to_string()))?;
    map.iter()
        .map(|(key, node)| Ok((key.clone(), decode_explain_node(key, node)?)))
        .collect()
}

fn decode_explain_node(key: &str, value: &Value) -> Result<ExplainNode> {
    let node = value.as_object().ok_or_else(|| {
        SearchError::Malformed(format!(
            "explanation for `{key}` is not structured; set debug.explain.structured=true"
        ))
    })?;
    let children = match node.get("details") {
        Some(Value::Array(details)) => details
            .iter()
            .map(|child| decode_explain_node(key, child))
            .collect::<Result<Vec<_>>>()?,
        _ => Vec::new(),
    };
    Ok(ExplainNode::new(
        node.get("value").and_then(Value::as_f64).unwrap_or(0.0),
        node.get("match").and_then(Value::as_bool).unwrap_or(false),
        text_field(node, "description"),
    )
    .with_children(children))
}

fn decode_timing(timing: &Map<String, Value>) -> (f64, Vec<PhaseTimings>) {
    let total = time_of(timing);
    let phases = timing
        .iter()
        .filter_map(|(name, phase)| Some((name, phase.as_object()?)))
        .map(|(name, phase)| PhaseTimings {
            name: name.clone(),
            components: phase
                .iter()
                .filter_map(|(component, entry)| {
                    Some((component.clone(), time_of(entry.as_object()?)))
                })
                .collect(),
        })
        .collect();
    (total, phases)
}

fn time_of(object: &Map<String, Value>) -> f64 {
    object.get("time").and_then(Value::as_f64).unwrap_or(0.0)
}
