use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Failure returned by the executor. `status_code` is only set for non-2xx responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ApiError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            status_code: None,
        }
    }

    pub fn http(status: u16, body: &str) -> Self {
        Self {
            error: format!("HTTP {status}: {body}"),
            status_code: Some(status),
        }
    }
}

/// Outcome of one call against the Whippy API. Failures are values, never panics or `Err`s.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult {
    /// Decoded 2xx response body, passed through untouched.
    Success(Value),
    Failure(ApiError),
}

impl ApiResult {
    /// True for executor failures and for payloads that themselves carry an `error` key.
    pub fn is_error(&self) -> bool {
        match self {
            ApiResult::Success(value) => value.get("error").is_some(),
            ApiResult::Failure(_) => true,
        }
    }

    /// The `error` member as the caller would see it, if any.
    pub fn error_detail(&self) -> Option<Value> {
        match self {
            ApiResult::Success(value) => value.get("error").cloned(),
            ApiResult::Failure(err) => Some(Value::String(err.error.clone())),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ApiResult::Success(value) => value,
            ApiResult::Failure(err) => serde_json::to_value(err)
                .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn http_failure_shape() {
        let value = ApiResult::Failure(ApiError::http(404, "not found")).into_value();
        assert_eq!(value, json!({ "error": "HTTP 404: not found", "status_code": 404 }));
    }

    #[test]
    fn transport_failure_has_no_status() {
        let value = ApiResult::Failure(ApiError::transport("connection refused")).into_value();
        assert_eq!(value, json!({ "error": "connection refused" }));
    }

    #[test]
    fn success_payload_with_error_key_counts_as_error() {
        let result = ApiResult::Success(json!({ "error": "quota exceeded" }));
        assert!(result.is_error());
        assert_eq!(result.error_detail(), Some(json!("quota exceeded")));
        assert!(!ApiResult::Success(json!({ "data": [] })).is_error());
    }
}
