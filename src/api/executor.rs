use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::api::types::{ApiResult, HttpMethod};

/// Performs one HTTP call against the Whippy API. Knows nothing about resources or actions.
///
/// Implementations must turn every failure (non-2xx, timeout, connection error, undecodable
/// body) into [`ApiResult::Failure`] rather than returning early or panicking.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Map<String, Value>>,
        query: Option<&Map<String, Value>>,
    ) -> ApiResult;
}

/// Flattens a JSON query map into string pairs. `null` entries are dropped; arrays and objects
/// are sent as compact JSON text.
pub fn query_pairs(query: &Map<String, Value>) -> Vec<(String, String)> {
    query
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect()
}
