use serde_json::Value;

/// Extracts the access token from a browser `session-store` value.
///
/// Accepts an object with `accessToken` (or `at`), a list of such objects where the `active` one
/// is preferred, or either of these encoded once more as a JSON string.
pub fn extract_access_token(session_store: &str) -> Option<String> {
    let mut data: Value = serde_json::from_str(session_store).ok()?;
    if let Value::String(inner) = &data {
        data = serde_json::from_str(inner).ok()?;
    }

    let token_of = |item: &Value| {
        item.get("accessToken")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
    };

    match &data {
        Value::Object(_) => token_of(&data).or_else(|| {
            data.get("at")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
        }),
        Value::Array(items) => items
            .iter()
            .filter(|item| item.get("active").and_then(Value::as_bool) == Some(true))
            .find_map(token_of)
            .or_else(|| items.iter().find_map(token_of)),
        _ => None,
    }
}
