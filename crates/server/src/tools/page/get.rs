//! page_get tool implementation.
//!
//! Retrieves a stored page with its outgoing links and backlinks.

use crosswiki_core::{Error, PageInfo, WikiDb};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the page_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageGetParams {
    /// Page url, e.g. "/Home".
    pub url: String,
}

/// Implementation of the page_get tool.
pub async fn get_impl(db: &WikiDb, params: PageGetParams) -> Result<CallToolResult, McpError> {
    let info: PageInfo = db
        .page_info(&params.url)
        .await?
        .ok_or_else(|| Error::PageNotFound(params.url.clone()))?;

    json_result(&info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::output;
    use crosswiki_core::{PageEdit, PageRenderer};

    #[tokio::test]
    async fn test_get_impl_missing() {
        let db = WikiDb::open_in_memory().await.unwrap();
        let params = PageGetParams { url: "/nonexistent".to_string() };

        let result = get_impl(&db, params).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_impl_found() {
        let db = WikiDb::open_in_memory().await.unwrap();
        let renderer = PageRenderer::new();
        db.save_page(&renderer, PageEdit::new("/a", "[[b]]")).await.unwrap();
        db.save_page(&renderer, PageEdit::new("/b", "[[a]] [[c]]")).await.unwrap();

        let result = get_impl(&db, PageGetParams { url: "/b".to_string() }).await.unwrap();
        let info: PageInfo = output(&result);

        assert_eq!(info.page.content, "[[a]] [[c]]");
        assert_eq!(info.outgoing.len(), 2);
        assert_eq!(info.incoming.len(), 1);
        assert_eq!(info.incoming[0].from, "/a");
    }
}
