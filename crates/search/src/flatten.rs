use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use solr_sync_protocol::Document;

/// Separator used when a multi-valued field is collapsed into one string.
pub const MULTI_VALUE_SEPARATOR: &str = ", ";

/// One document as printable `field -> text` pairs, in source field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRecord {
    fields: Vec<(String, String)>,
}

impl FlatRecord {
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Compact JSON object, keys in record order.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for FlatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Flatten one document. Multi-valued fields are joined with `", "`; empty values are kept.
#[must_use]
pub fn flatten(document: &Document) -> FlatRecord {
    let fields = document
        .fields()
        .iter()
        .map(|(key, value)| (key.clone(), flatten_value(value)))
        .collect();
    FlatRecord { fields }
}

/// Render a result set as JSON lines, one per document, in input order.
pub fn render_json_lines<'a>(
    documents: impl IntoIterator<Item = &'a Document>,
) -> serde_json::Result<Vec<String>> {
    documents
        .into_iter()
        .map(|doc| flatten(doc).to_json_line())
        .collect()
}

fn flatten_value(value: &Value) -> String {
    match value {
        Value::Array(values) => values
            .iter()
            .map(scalar_text)
            .collect::<Vec<_>>()
            .join(MULTI_VALUE_SEPARATOR),
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // nested structures have no scalar form
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc(raw: &str) -> Document {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn multi_valued_field_is_joined() {
        let record = flatten(&doc(r#"{"tags": ["a", "b", "c"]}"#));
        assert_eq!(record.get("tags"), Some("a, b, c"));
    }

    #[test]
    fn field_order_follows_source() {
        let record = flatten(&doc(r#"{"z": 1, "id": "7", "a": ["x"], "m": true}"#));
        let keys: Vec<&str> = record.fields().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "id", "a", "m"]);
    }

    #[test]
    fn empty_and_falsy_values_are_kept() {
        let record = flatten(&doc(
            r#"{"empty": "", "zero": 0, "no": false, "none": null, "list": []}"#,
        ));
        assert_eq!(
            record.fields(),
            &[
                ("empty".to_string(), String::new()),
                ("zero".to_string(), "0".to_string()),
                ("no".to_string(), "false".to_string()),
                ("none".to_string(), String::new()),
                ("list".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn document_without_fields_flattens_to_empty_record() {
        let record = flatten(&Document::default());
        assert!(record.is_empty());
        assert_eq!(record.to_json_line().unwrap(), "{}");
    }

    #[test]
    fn nested_values_render_as_compact_json() {
        let record = flatten(&doc(r#"{"meta": {"k": 1}, "mixed": [1, {"k": 2}]}"#));
        assert_eq!(record.get("meta"), Some(r#"{"k":1}"#));
        assert_eq!(record.get("mixed"), Some(r#"1, {"k":2}"#));
    }

    #[test]
    fn json_lines_keep_input_and_field_order() {
        let docs = vec![
            doc(r#"{"id": "2", "title": "B", "cat": ["x", "y"]}"#),
            doc(r#"{"id": "1", "title": "A"}"#),
        ];
        let lines = render_json_lines(&docs).unwrap();
        assert_eq!(
            lines,
            vec![
                r#"{"id":"2","title":"B","cat":"x, y"}"#.to_string(),
                r#"{"id":"1","title":"A"}"#.to_string(),
            ]
        );
        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed, json!({"id": "2", "title": "B", "cat": "x, y"}));
    }
}
