//! page_delete tool implementation.
//!
//! Deletes a page and the links it makes. Links pointing at it remain.

use crosswiki_core::WikiDb;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the page_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageDeleteParams {
    /// Page url, e.g. "/Home".
    pub url: String,
}

/// Output from the page_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageDeleteOutput {
    /// Whether a page was stored at the url.
    pub deleted: bool,
}

/// Implementation of the page_delete tool.
pub async fn delete_impl(db: &WikiDb, params: PageDeleteParams) -> Result<CallToolResult, McpError> {
    let deleted = db.delete_page(&params.url).await?;
    json_result(&PageDeleteOutput { deleted })
}
