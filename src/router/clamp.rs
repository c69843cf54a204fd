use serde_json::{Map, Value};

/// Upper bounds applied to query parameters before a request leaves the process.
pub const QUERY_CAPS: &[(&str, u64)] = &[("limit", 100), ("messages_limit", 500)];

/// Caps numeric `limit`/`messages_limit` values. Values at or under the cap and non-numeric
/// values are left as they are.
pub fn clamp_query(query: &mut Map<String, Value>) {
    for (key, cap) in QUERY_CAPS {
        let Some(value) = query.get_mut(*key) else {
            continue;
        };
        let Some(requested) = value.as_f64() else {
            continue;
        };
        if requested > *cap as f64 {
            tracing::debug!(key = *key, cap = *cap, requested, "clamping query parameter");
            *value = Value::from(*cap);
        }
    }
}
