use serde_json::{Map, Value};

/// Copy of `payload` holding only allow-listed keys with non-null values.
///
/// JSON `null` counts as absent: clients cannot clear a column by sending
/// `null`, and a `null` never overwrites a stored value.
pub fn sanitize_fields(payload: &Map<String, Value>, allowed: &[&str]) -> Map<String, Value> {
    payload
        .iter()
        .filter(|(key, value)| !value.is_null() && allowed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn drops_unknown_and_null_keys() {
        let payload = map(json!({ "name": "Widget", "extraField": 1, "sku": null }));
        let out = sanitize_fields(&payload, &["name", "sku"]);
        assert_eq!(Value::Object(out), json!({ "name": "Widget" }));
    }

    #[test]
    fn keeps_falsy_but_present_values() {
        let payload = map(json!({ "is_read": false, "score": 0, "name": "" }));
        let out = sanitize_fields(&payload, &["is_read", "score", "name"]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn empty_input_and_idempotence() {
        assert!(sanitize_fields(&Map::new(), &["name"]).is_empty());

        let payload = map(json!({ "name": "Widget", "status": "draft", "id": "x", "junk": [1] }));
        let once = sanitize_fields(&payload, &["name", "status"]);
        let twice = sanitize_fields(&once, &["name", "status"]);
        assert_eq!(once, twice);
    }

    #[test]
    fn input_is_not_mutated() {
        let payload = map(json!({ "name": "Widget", "junk": true }));
        let _ = sanitize_fields(&payload, &["name"]);
        assert!(payload.contains_key("junk"));
    }
}
