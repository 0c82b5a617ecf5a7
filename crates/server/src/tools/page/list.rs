//! page_list tool implementation.

use crosswiki_core::{PageSummary, WikiDb};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the page_list tool (none).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PageListParams {}

/// Output from the page_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageListOutput {
    /// Every stored page, ordered by url.
    pub pages: Vec<PageSummary>,
}

/// Implementation of the page_list tool.
pub async fn list_impl(db: &WikiDb, _params: PageListParams) -> Result<CallToolResult, McpError> {
    let pages = db.list_pages().await?;
    json_result(&PageListOutput { pages })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::output;
    use crosswiki_core::PageRenderer;

    #[tokio::test]
    async fn test_list_after_seed() {
        let db = WikiDb::open_in_memory().await.unwrap();
        db.ensure_index_page(&PageRenderer::new()).await.unwrap();

        let out: PageListOutput = output(&list_impl(&db, PageListParams::default()).await.unwrap());
        assert_eq!(out.pages.len(), 1);
        assert_eq!(out.pages[0].url, "/");
    }
}
