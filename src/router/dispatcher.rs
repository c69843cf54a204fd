use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::api::client::WhippyClient;
use crate::api::executor::RequestExecutor;
use crate::api::types::HttpMethod;
use crate::config::Config;
use crate::errors::WhippyResult;
use crate::router::clamp::clamp_query;
use crate::router::input::RawInput;
use crate::router::routes::{self, Route};

/// One invocation of the `whippy_api` tool.
#[derive(Debug, Clone, Default)]
pub struct OperationRequest {
    pub resource: String,
    pub action: String,
    pub resource_id: Option<String>,
    /// Request body (`data` on the tool surface).
    pub body: RawInput,
    /// Query parameters (`params` on the tool surface).
    pub query: RawInput,
}

impl OperationRequest {
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.resource_id = Some(id.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<RawInput>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_query(mut self, query: impl Into<RawInput>) -> Self {
        self.query = query.into();
        self
    }
}

/// Validates, routes and clamps a logical request, then hands it to the executor.
pub struct Dispatcher {
    config: Arc<Config>,
    executor: Arc<dyn RequestExecutor>,
}

impl Dispatcher {
    pub fn new(config: Arc<Config>, executor: Arc<dyn RequestExecutor>) -> Self {
        Self { config, executor }
    }

    /// Dispatcher backed by the real HTTP client.
    pub fn from_config(config: Arc<Config>) -> Self {
        let executor = Arc::new(WhippyClient::new(config.clone()));
        Self::new(config, executor)
    }

    /// Never fails: every error is returned as a JSON value carrying an `error` key.
    pub async fn dispatch(&self, request: OperationRequest) -> Value {
        let resource = request.resource.clone();
        let action = request.action.clone();
        match self.try_dispatch(request).await {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(resource = %resource, action = %action, error = %e, "request rejected");
                e.to_value()
            }
        }
    }

    async fn try_dispatch(&self, request: OperationRequest) -> WhippyResult<Value> {
        let body = request.body.normalize("data")?;
        let mut query = request.query.normalize("params")?;

        let route = routes::resolve(
            &request.resource,
            &request.action,
            request.resource_id.as_deref(),
        )?;
        let decision = match route {
            Route::HealthCheck => return Ok(self.health_check().await),
            Route::Api(decision) => decision,
        };

        if let Some(query) = query.as_mut() {
            clamp_query(query);
        }

        let result = self
            .executor
            .execute(decision.method, &decision.path, body.as_ref(), query.as_ref())
            .await;
        Ok(result.into_value())
    }

    /// Lists a single contact to prove the key and base URL work.
    pub async fn health_check(&self) -> Value {
        let mut query = Map::new();
        query.insert("limit".into(), Value::from(1));

        let result = self
            .executor
            .execute(HttpMethod::Get, "/contacts", None, Some(&query))
            .await;

        match result.error_detail() {
            Some(details) => {
                tracing::info!(error = %details, "health check failed");
                json!({
                    "status": "error",
                    "message": "API key may be invalid or API is unreachable",
                    "details": details,
                })
            }
            None => {
                tracing::info!(api_base = %self.config.base_url, "health check passed");
                json!({
                    "status": "healthy",
                    "message": "Successfully connected to Whippy AI API",
                    "api_base": self.config.base_url,
                })
            }
        }
    }
}
