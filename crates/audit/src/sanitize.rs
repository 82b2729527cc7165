//! Redaction of sensitive fields before an old/new value pair is persisted.

use serde_json::Value;

const REDACTED: &str = "[redacted]";

fn is_sensitive_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().replace(['_', '-'], "").as_str(),
        "password" | "passwordhash" | "qrtoken" | "accesstoken"
    )
}

/// Recursively walk `value`, replacing the value of any object key that
/// names `password`, `passwordHash`, `qrToken`, or `accessToken` (in any
/// snake_case/camelCase spelling) with a fixed redaction marker.
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| {
                    if is_sensitive_key(&k) {
                        (k, Value::String(REDACTED.to_string()))
                    } else {
                        (k, sanitize_value(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_known_sensitive_keys() {
        let input = json!({
            "username": "jdoe",
            "password": "hunter2",
            "passwordHash": "abc",
            "qrToken": "deadbeef",
            "accessToken": "eyJ...",
        });
        let out = sanitize_value(input);
        assert_eq!(out["username"], json!("jdoe"));
        assert_eq!(out["password"], json!(REDACTED));
        assert_eq!(out["passwordHash"], json!(REDACTED));
        assert_eq!(out["qrToken"], json!(REDACTED));
        assert_eq!(out["accessToken"], json!(REDACTED));
    }

    #[test]
    fn recurses_into_nested_objects_and_arrays() {
        let input = json!({
            "team": {"name": "Smoke Signals", "password_hash": "xyz"},
            "items": [{"qr_token": "abc123"}],
        });
        let out = sanitize_value(input);
        assert_eq!(out["team"]["name"], json!("Smoke Signals"));
        assert_eq!(out["team"]["password_hash"], json!(REDACTED));
        assert_eq!(out["items"][0]["qr_token"], json!(REDACTED));
    }

    #[test]
    fn leaves_unrelated_fields_untouched() {
        let input = json!({"score_value": 8.5, "comment": "great bark"});
        assert_eq!(sanitize_value(input.clone()), input);
    }
}
