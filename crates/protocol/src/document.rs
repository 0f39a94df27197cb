use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered field map. Field order is the order the source produced.
pub type Fields = Map<String, Value>;

const TITLE_FIELDS: [&str; 2] = ["title", "post_title"];

/// One content item as read from the content source or returned by the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: Fields,
}

impl Document {
    #[must_use]
    pub fn new(fields: Fields) -> Self {
        Self { fields }
    }

    /// Builds a document from a JSON value; anything but an object yields `None`.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Identifier of the document. Numeric ids are rendered as their decimal text.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.fields.get("id").and_then(scalar_text)
    }

    /// Human readable title, or an empty string when the source has none.
    #[must_use]
    pub fn title(&self) -> String {
        TITLE_FIELDS
            .iter()
            .find_map(|name| self.fields.get(*name).and_then(scalar_text))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Selection criteria for an index run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_type: Option<String>,
}

impl Selection {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn post_type(post_type: impl Into<String>) -> Self {
        Self {
            post_type: Some(post_type.into()),
        }
    }

    /// Whether `document` is eligible under this selection.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        let Some(wanted) = self.post_type.as_deref() else {
            return true;
        };
        document
            .get("post_type")
            .and_then(Value::as_str)
            .is_some_and(|actual| actual == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    #[test]
    fn numeric_and_string_ids_are_text() {
        assert_eq!(doc(json!({"id": 42})).id(), Some("42".to_string()));
        assert_eq!(doc(json!({"id": "post-7"})).id(), Some("post-7".to_string()));
        assert_eq!(doc(json!({"id": null})).id(), None);
        assert_eq!(doc(json!({})).id(), None);
    }

    #[test]
    fn title_falls_back_to_post_title() {
        assert_eq!(doc(json!({"title": "A"})).title(), "A");
        assert_eq!(doc(json!({"post_title": "B"})).title(), "B");
        assert_eq!(doc(json!({"id": 1})).title(), "");
    }

    #[test]
    fn field_order_is_preserved() {
        let d: Document = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<&str> = d.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn selection_filters_by_post_type() {
        let page = doc(json!({"id": 1, "post_type": "page"}));
        let post = doc(json!({"id": 2, "post_type": "post"}));
        let untyped = doc(json!({"id": 3}));

        assert!(Selection::all().matches(&page));
        assert!(Selection::all().matches(&untyped));
        assert!(Selection::post_type("page").matches(&page));
        assert!(!Selection::post_type("page").matches(&post));
        assert!(!Selection::post_type("page").matches(&untyped));
    }

    #[test]
    fn non_object_values_are_not_documents() {
        assert!(Document::from_value(json!([1, 2])).is_none());
        assert!(Document::from_value(json!("x")).is_none());
    }
}
