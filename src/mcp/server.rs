use serde_json::{json, Map, Value};

use crate::mcp::tools::{load_tool, TOOL_NAME};
use crate::mcp::types::{
    json_rpc_error, json_rpc_response, JsonRpcRequest, INVALID_PARAMS, MCP_VERSION,
    METHOD_NOT_FOUND, PARSE_ERROR, SERVER_NAME,
};
use crate::router::dispatcher::{Dispatcher, OperationRequest};
use crate::router::input::RawInput;

/// JSON-RPC front end exposing the single `whippy_api` tool. Holds no per-session state, so one
/// instance can serve concurrent requests.
pub struct McpServer {
    dispatcher: Dispatcher,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Handles one raw protocol line. Returns the reply to write, if any.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable JSON-RPC message");
                Some(json_rpc_error(None, PARSE_ERROR, "Parse error"))
            }
        }
    }

    pub async fn handle(&self, request: JsonRpcRequest) -> Option<Value> {
        let expects_response = request.expects_response();

        match request.method.as_str() {
            "initialize" => {
                let protocol_version = request
                    .params
                    .as_ref()
                    .and_then(|v| v.get("protocolVersion"))
                    .and_then(|v| v.as_str())
                    .unwrap_or(MCP_VERSION)
                    .to_string();
                Some(json_rpc_response(
                    request.id,
                    json!({
                        "protocolVersion": protocol_version,
                        "serverInfo": {
                            "name": SERVER_NAME,
                            "version": env!("CARGO_PKG_VERSION"),
                        },
                        "capabilities": { "tools": {} },
                    }),
                ))
            }
            "notifications/initialized" | "initialized" => {
                tracing::debug!("client initialized");
                None
            }
            "ping" => Some(json_rpc_response(request.id, json!({}))),
            "tools/list" => {
                let result = match load_tool() {
                    Ok(tool) => json!({ "tools": [tool] }),
                    Err(e) => {
                        tracing::error!(error = %e, "tool definition unavailable");
                        json!({ "tools": [] })
                    }
                };
                Some(json_rpc_response(request.id, result))
            }
            "tools/call" => match self.call_tool(request.params).await {
                Ok(result) => Some(json_rpc_response(request.id, result)),
                Err(message) => Some(json_rpc_error(request.id, INVALID_PARAMS, &message)),
            },
            other if expects_response => {
                tracing::debug!(method = other, "unknown method");
                Some(json_rpc_error(request.id, METHOD_NOT_FOUND, "Method not found"))
            }
            _ => None,
        }
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, String> {
        let Some(Value::Object(params)) = params else {
            return Err("params must be an object".into());
        };
        let name = params.get("name").and_then(Value::as_str).unwrap_or("");
        if name != TOOL_NAME {
            return Err(format!("Unknown tool: {name}"));
        }
        let args = match params.get("arguments") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(args)) => args.clone(),
            Some(_) => return Err("arguments must be an object".into()),
        };

        let request = OperationRequest {
            resource: required_str(&args, "resource")?,
            action: required_str(&args, "action")?,
            resource_id: optional_str(&args, "resource_id")?,
            body: RawInput::from(args.get("data").cloned()),
            query: RawInput::from(args.get("params").cloned()),
        };
        tracing::debug!(resource = %request.resource, action = %request.action, "tool call");

        let result = self.dispatcher.dispatch(request).await;
        Ok(tool_result(result))
    }
}

fn required_str(args: &Map<String, Value>, key: &str) -> Result<String, String> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(format!("argument '{key}' must be a string")),
        None => Err(format!("missing required argument '{key}'")),
    }
}

fn optional_str(args: &Map<String, Value>, key: &str) -> Result<Option<String>, String> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(format!("argument '{key}' must be a string")),
    }
}

/// Wraps a dispatcher result in the MCP `CallToolResult` shape.
fn tool_result(result: Value) -> Value {
    let is_error = result.get("error").is_some()
        || result.get("status").and_then(Value::as_str) == Some("error");
    let text = serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string());
    let mut out = json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    });
    if result.is_object() {
        out["structuredContent"] = result;
    }
    out
}
