use crate::errors::{WhippyError, WhippyResult};
use crate::mcp::types::McpTool;

pub const TOOL_NAME: &str = "whippy_api";

/// Loads the `whippy_api` tool definition from prompts/tools/whippy_api.json.
/// The JSON is embedded at compile time via include_str!.
pub fn load_tool() -> WhippyResult<McpTool> {
    let json = include_str!("../../prompts/tools/whippy_api.json");
    serde_json::from_str(json)
        .map_err(|e| WhippyError::Config(format!("Failed to parse tool definition: {e}")))
}
