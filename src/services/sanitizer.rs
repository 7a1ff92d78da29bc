//! Removal of document-store operator keys from untrusted JSON.
//!
//! Any object key that starts with `$` or contains `.` is dropped together
//! with its value, at every depth. Everything else is left as it was.

use serde_json::{Map, Value};

const OPERATOR_PREFIX: char = '$';
const PATH_SEPARATOR: char = '.';

/// True if `key` could be read as an operator or a dotted field path
pub fn is_reserved_key(key: &str) -> bool {
    key.starts_with(OPERATOR_PREFIX) || key.contains(PATH_SEPARATOR)
}

/// Sanitizes `value`, discarding the list of dropped keys
pub fn sanitize(value: Value) -> Value {
    let mut dropped = Vec::new();
    sanitize_collecting(value, &mut dropped)
}

/// Sanitizes `value` and appends every dropped key to `dropped`.
///
/// Each drop is also logged at `warn`, since it usually means someone is
/// probing for query injection.
pub fn sanitize_collecting(value: Value, dropped: &mut Vec<String>) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| sanitize_collecting(item, dropped))
                .collect(),
        ),
        Value::Object(fields) => {
            let mut clean = Map::with_capacity(fields.len());
            for (key, field) in fields {
                if is_reserved_key(&key) {
                    tracing::warn!(key = %key, "NoSQL injection attempt blocked");
                    dropped.push(key);
                    continue;
                }
                let field = sanitize_collecting(field, dropped);
                clean.insert(key, field);
            }
            Value::Object(clean)
        }
        scalar => scalar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strips_operators_and_dotted_keys() {
        let input = json!({ "$where": "1==1", "name": "ok", "nested": { "a.b": 1, "c": 2 } });
        assert_eq!(sanitize(input), json!({ "name": "ok", "nested": { "c": 2 } }));
    }

    #[test]
    fn test_scalars_pass_through() {
        for value in [json!(null), json!(true), json!(3.5), json!("$gt"), json!("a.b")] {
            assert_eq!(sanitize(value.clone()), value);
        }
    }

    #[test]
    fn test_arrays_keep_order_and_length() {
        let input = json!([{ "$gt": 1, "x": 1 }, 2, [{ "y.z": 3, "w": [ { "$ne": null } ] }], "s"]);
        let expected = json!([{ "x": 1 }, 2, [{ "w": [ {} ] }], "s"]);
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_dropped_value_is_not_inspected() {
        let mut dropped = Vec::new();
        let input = json!({ "$or": [ { "$gt": 1 } ], "keep": { "$in": [] } });
        let output = sanitize_collecting(input, &mut dropped);

        assert_eq!(output, json!({ "keep": {} }));
        assert_eq!(dropped, vec!["$or".to_string(), "$in".to_string()]);
    }

    #[test]
    fn test_dollar_inside_key_is_allowed() {
        let input = json!({ "price$": 1, "a$b": 2 });
        assert_eq!(sanitize(input.clone()), input);
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let samples = [
            json!({ "$where": "x", "a": { "b.c": [ { "$d": 1, "e": { "f": "g" } } ], "h": [1, 2] } }),
            json!([[{ "": { ".": 1, "$": 2, "ok": null } }]]),
            json!("plain"),
            json!({}),
        ];
        for sample in samples {
            let once = sanitize(sample);
            assert_eq!(sanitize(once.clone()), once);
        }
    }

    #[test]
    fn test_deep_nesting_keeps_siblings() {
        let input = json!({ "l1": { "l2": { "l3": { "$set": { "admin": true }, "keep": 1 }, "k2": "v" } } });
        let expected = json!({ "l1": { "l2": { "l3": { "keep": 1 }, "k2": "v" } } });
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn test_reserved_key_detection() {
        assert!(is_reserved_key("$where"));
        assert!(is_reserved_key("profile.isAdmin"));
        assert!(is_reserved_key("."));
        assert!(!is_reserved_key("username"));
        assert!(!is_reserved_key(""));
    }
}
