//! Normalization for the backend's inconsistent response envelopes.
//!
//! List endpoints disagree about their wrapping: some return a bare array,
//! some `{ "results": [...] }`, some `{ "data": [...] }`. Every dashboard
//! page used to repeat the same unwrapping inline; it happens once, here.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// The wrapping a list response arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListShape {
    /// A bare JSON array.
    Bare,
    /// `{ "results": [...] }` (paginated Django endpoints).
    Results,
    /// `{ "data": [...] }`.
    Data,
    /// Anything else. Normalizes to an empty list.
    Unknown,
}

/// Classify a list response body.
pub fn classify(body: &Value) -> ListShape {
    if body.is_array() {
        return ListShape::Bare;
    }
    if let Some(object) = body.as_object() {
        if object.get("results").map(Value::is_array) == Some(true) {
            return ListShape::Results;
        }
        if object.get("data").map(Value::is_array) == Some(true) {
            return ListShape::Data;
        }
    }
    ListShape::Unknown
}

fn items(body: &Value) -> Option<&Vec<Value>> {
    match classify(body) {
        ListShape::Bare => body.as_array(),
        ListShape::Results => body.get("results").and_then(Value::as_array),
        ListShape::Data => body.get("data").and_then(Value::as_array),
        ListShape::Unknown => None,
    }
}

/// Extract the items of a list response, whatever its envelope.
///
/// Unrecognized shapes degrade to an empty list so the page stays
/// renderable; the condition is logged because it usually means the
/// backend contract drifted.
pub fn normalize_list<T: DeserializeOwned>(body: &Value) -> Vec<T> {
    let Some(raw) = items(body) else {
        log::warn!(
            "unrecognized list envelope ({}), rendering empty list",
            value_kind(body)
        );
        return Vec::new();
    };

    raw.iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(value) => Some(value),
            Err(error) => {
                log::warn!("skipping malformed list item: {error}");
                None
            }
        })
        .collect()
}

/// Unwrap a single-item `{ "data": {...} }` envelope, if present.
///
/// Detail and create endpoints show the same inconsistency as lists: some
/// return the object directly, others wrap it.
pub fn unwrap_object(body: Value) -> Value {
    match body {
        Value::Object(mut object) if object.get("data").map(Value::is_object) == Some(true) => {
            object.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Row {
        id: u64,
        name: String,
    }

    fn rows() -> Value {
        json!([
            { "id": 1, "name": "Acme Corp" },
            { "id": 2, "name": "Globex" },
        ])
    }

    #[test]
    fn test_all_three_envelopes_normalize_identically() {
        let bare = rows();
        let results = json!({ "results": rows(), "count": 2 });
        let data = json!({ "data": rows() });

        let from_bare: Vec<Row> = normalize_list(&bare);
        let from_results: Vec<Row> = normalize_list(&results);
        let from_data: Vec<Row> = normalize_list(&data);

        assert_eq!(from_bare.len(), 2);
        assert_eq!(from_bare, from_results);
        assert_eq!(from_bare, from_data);
    }

    #[test]
    fn test_unknown_shapes_normalize_to_empty() {
        let _ = env_logger::builder().is_test(true).try_init();
        for body in [
            json!({ "detail": "throttled" }),
            json!("oops"),
            json!(42),
            json!(null),
            json!({ "results": "not-a-list" }),
        ] {
            let rows: Vec<Row> = normalize_list(&body);
            assert!(rows.is_empty(), "expected empty for {body}");
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify(&rows()), ListShape::Bare);
        assert_eq!(classify(&json!({ "results": [] })), ListShape::Results);
        assert_eq!(classify(&json!({ "data": [] })), ListShape::Data);
        assert_eq!(classify(&json!({ "data": {} })), ListShape::Unknown);
        assert_eq!(classify(&json!(null)), ListShape::Unknown);
    }

    #[test]
    fn test_malformed_items_are_skipped() {
        let body = json!([
            { "id": 1, "name": "Acme Corp" },
            { "id": "not-a-number", "name": "Broken" },
        ]);
        let rows: Vec<Row> = normalize_list(&body);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
    }

    #[test]
    fn test_unwrap_object_data_envelope() {
        let wrapped = json!({ "data": { "id": 7, "name": "Acme Corp" } });
        assert_eq!(
            unwrap_object(wrapped),
            json!({ "id": 7, "name": "Acme Corp" })
        );

        let bare = json!({ "id": 7, "name": "Acme Corp" });
        assert_eq!(unwrap_object(bare.clone()), bare);
    }
}
