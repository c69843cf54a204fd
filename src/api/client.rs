use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::{Map, Value};

use crate::api::executor::{query_pairs, RequestExecutor};
use crate::api::types::{ApiError, ApiResult, HttpMethod};
use crate::config::{Config, REQUEST_TIMEOUT};
use crate::errors::{WhippyError, WhippyResult};

/// Shared-secret header (`X-WHIPPY-KEY`), lowercase as HTTP/1.1 sends it.
pub const API_KEY_HEADER: &str = "x-whippy-key";

/// reqwest-backed executor. Every call builds its own client, so nothing is pooled between calls.
pub struct WhippyClient {
    config: Arc<Config>,
}

impl WhippyClient {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    fn headers(&self) -> WhippyResult<HeaderMap> {
        let key = HeaderValue::from_str(&self.config.api_key).map_err(|_| {
            WhippyError::Config("API key contains characters not allowed in an HTTP header".into())
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Map<String, Value>>,
        query: Option<&Map<String, Value>>,
    ) -> WhippyResult<ApiResult> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        // Redirects are not followed: a 3xx is a failure, and the key header must not reach
        // another host.
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let mut request = client.request(method.into(), &url).headers(self.headers()?);
        if let Some(query) = query {
            request = request.query(&query_pairs(query));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(method = method.as_str(), endpoint = %endpoint, "sending Whippy request");
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), endpoint = %endpoint, "Whippy API returned an error status");
            return Ok(ApiResult::Failure(ApiError::http(status.as_u16(), &text)));
        }

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(ApiResult::Success(Value::Object(Map::new())));
        }
        let value: Value = serde_json::from_slice(&bytes)?;
        Ok(ApiResult::Success(value))
    }
}

#[async_trait]
impl RequestExecutor for WhippyClient {
    async fn execute(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Map<String, Value>>,
        query: Option<&Map<String, Value>>,
    ) -> ApiResult {
        match self.send(method, endpoint, body, query).await {
            Ok(result) => result,
            Err(e) => {
                let message = transport_message(&e);
                tracing::warn!(method = method.as_str(), endpoint = %endpoint, error = %message, "Whippy request failed");
                ApiResult::Failure(ApiError::transport(message))
            }
        }
    }
}

/// Flattens an error and its sources into one line, e.g.
/// `error sending request for url (...): client error (Connect): tcp connect error`.
fn transport_message(err: &WhippyError) -> String {
    let mut message = match err {
        WhippyError::Http(inner) => inner.to_string(),
        other => other.to_string(),
    };
    let mut source = match err {
        WhippyError::Http(inner) => std::error::Error::source(inner),
        other => std::error::Error::source(other),
    };
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one connection, answers it with `status` and `body`, and yields the raw request.
    async fn one_shot(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                    let len = head
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .map(|v| v.trim().parse::<usize>().unwrap())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + len {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&buf).into_owned()
        });
        (format!("http://{addr}/v1"), handle)
    }

    fn client(base_url: &str) -> WhippyClient {
        WhippyClient::new(Arc::new(Config::new(base_url, "secret-key").unwrap()))
    }

    #[tokio::test]
    async fn post_sends_fixed_headers_and_body() {
        let (base, server) = one_shot("201 Created", r#"{"id":"camp_1"}"#).await;
        let body = json!({ "name": "Summer Sale", "message": "Get 20% off!" });

        let result = client(&base)
            .execute(HttpMethod::Post, "/campaigns", body.as_object(), None)
            .await;
        assert_eq!(result, ApiResult::Success(json!({ "id": "camp_1" })));

        let raw = server.await.unwrap();
        let lower = raw.to_lowercase();
        assert!(lower.starts_with("post /v1/campaigns http/1.1"));
        assert!(lower.contains("x-whippy-key: secret-key"));
        assert!(lower.contains("accept: application/json"));
        assert!(lower.contains("content-type: application/json"));
        let sent: Value = serde_json::from_str(raw.split("\r\n\r\n").nth(1).unwrap()).unwrap();
        assert_eq!(sent, body);
    }

    #[tokio::test]
    async fn get_encodes_query_parameters() {
        let (base, server) = one_shot("200 OK", r#"{"data":[]}"#).await;
        let query = json!({ "limit": 1 });

        let result = client(&base)
            .execute(HttpMethod::Get, "/contacts", None, query.as_object())
            .await;
        assert_eq!(result, ApiResult::Success(json!({ "data": [] })));

        let raw = server.await.unwrap().to_lowercase();
        assert!(raw.starts_with("get /v1/contacts?limit=1 http/1.1"));
    }

    #[tokio::test]
    async fn non_success_status_becomes_error_value() {
        let (base, server) = one_shot("401 Unauthorized", r#"{"message":"bad key"}"#).await;

        let result = client(&base)
            .execute(HttpMethod::Get, "/contacts", None, None)
            .await;
        server.await.unwrap();
        assert_eq!(
            result.into_value(),
            json!({ "error": r#"HTTP 401: {"message":"bad key"}"#, "status_code": 401 })
        );
    }

    #[tokio::test]
    async fn redirect_is_not_followed() {
        let (base, server) =
            one_shot("302 Found\r\nLocation: http://127.0.0.1:9/elsewhere", "").await;

        let result = client(&base)
            .execute(HttpMethod::Get, "/contacts", None, None)
            .await;
        server.await.unwrap();
        assert!(matches!(
            result,
            ApiResult::Failure(ApiError {
                status_code: Some(302),
                ..
            })
        ));
    }

    #[tokio::test]
    async fn undecodable_success_body_is_a_transport_error() {
        let (base, server) = one_shot("200 OK", "not json").await;

        let result = client(&base)
            .execute(HttpMethod::Get, "/contacts", None, None)
            .await;
        server.await.unwrap();
        match result {
            ApiResult::Failure(err) => {
                assert!(err.status_code.is_none());
                assert!(!err.error.is_empty());
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_success_body_is_an_empty_object() {
        let (base, server) = one_shot("200 OK", "").await;

        let result = client(&base)
            .execute(HttpMethod::Post, "/messages", None, None)
            .await;
        server.await.unwrap();
        assert_eq!(result, ApiResult::Success(json!({})));
    }

    #[tokio::test]
    async fn connection_failure_has_no_status_code() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client(&format!("http://{addr}"))
            .execute(HttpMethod::Get, "/contacts", None, None)
            .await;
        match result {
            ApiResult::Failure(err) => {
                assert!(err.status_code.is_none());
                assert!(!err.error.is_empty());
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
