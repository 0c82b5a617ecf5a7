//! MCP tool implementations.
//!
//! This module contains all tools exposed by the crosswiki server.

use crosswiki_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

pub mod crosslinks;
pub mod page;
pub mod wiki_render;

pub use crosslinks::{CrosslinksParams, Direction};
pub use page::{PageDeleteParams, PageGetParams, PageListParams, PageSaveParams};
pub use wiki_render::WikiRenderParams;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
