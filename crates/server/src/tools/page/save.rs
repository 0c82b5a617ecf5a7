//! page_save tool implementation.
//!
//! Renders and stores a page, replacing the links it makes in the same
//! transaction.

use crosswiki_core::{Error, Expect, PageEdit, PageRenderer, WikiDb};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the page_save tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageSaveParams {
    /// Page url, must start with "/".
    pub url: String,

    /// Markdown source of the page.
    pub content: String,

    /// Page title. Keeps the stored title, or uses the url, when omitted.
    #[serde(default)]
    pub title: Option<String>,

    /// Lock the page against further edits.
    #[serde(default)]
    pub locked: bool,

    /// `modified` stamp of the revision being edited. The save fails with a
    /// conflict if the page has changed since.
    #[serde(default)]
    pub expected_modified: Option<String>,

    /// Fail if the page already exists.
    #[serde(default)]
    pub create_only: bool,

    /// Edit a locked page anyway.
    #[serde(default)]
    pub unlock_override: bool,
}

/// Output from the page_save tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageSaveOutput {
    pub url: String,
    /// Stamp of the new revision; pass as `expected_modified` on the next edit.
    pub modified: String,
    /// Link targets written to the crosslink graph.
    pub links: Vec<String>,
    /// Whether the page was created by this save.
    pub created: bool,
}

/// Implementation of the page_save tool.
pub async fn save_impl(
    db: &WikiDb, renderer: &PageRenderer, params: PageSaveParams,
) -> Result<CallToolResult, McpError> {
    let expect = match (params.create_only, params.expected_modified) {
        (true, Some(_)) => {
            return Err(Error::InvalidInput("create_only and expected_modified are mutually exclusive".into()).into());
        }
        (true, None) => Expect::Missing,
        (false, Some(stamp)) => Expect::Modified(stamp),
        (false, None) => Expect::Any,
    };

    let mut edit = PageEdit::new(params.url, params.content)
        .locked(params.locked)
        .expect(expect)
        .unlock_override(params.unlock_override);
    if let Some(title) = params.title {
        edit = edit.title(title);
    }

    let saved = db.save_page(renderer, edit).await?;

    json_result(&PageSaveOutput {
        url: saved.page.url,
        modified: saved.page.modified,
        links: saved.page.links,
        created: saved.created,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::output;

    fn params(url: &str, content: &str) -> PageSaveParams {
        PageSaveParams {
            url: url.into(),
            content: content.into(),
            title: None,
            locked: false,
            expected_modified: None,
            create_only: false,
            unlock_override: false,
        }
    }

    #[tokio::test]
    async fn test_save_then_edit_with_stamp() {
        let db = WikiDb::open_in_memory().await.unwrap();
        let renderer = PageRenderer::new();

        let first: PageSaveOutput = output(&save_impl(&db, &renderer, params("/a", "[[b]]")).await.unwrap());
        assert!(first.created);
        assert_eq!(first.links, vec!["/b"]);

        let edit = PageSaveParams { expected_modified: Some(first.modified.clone()), ..params("/a", "[[c]]") };
        let second: PageSaveOutput = output(&save_impl(&db, &renderer, edit).await.unwrap());
        assert!(!second.created);
        assert_eq!(second.links, vec!["/c"]);

        let stale = PageSaveParams { expected_modified: Some(first.modified), ..params("/a", "[[d]]") };
        assert!(save_impl(&db, &renderer, stale).await.is_err());
        assert_eq!(db.outgoing("/a").await.unwrap()[0].to, "/c");
    }

    #[tokio::test]
    async fn test_create_only_conflicts() {
        let db = WikiDb::open_in_memory().await.unwrap();
        let renderer = PageRenderer::new();
        save_impl(&db, &renderer, params("/a", "x")).await.unwrap();

        let again = PageSaveParams { create_only: true, ..params("/a", "y") };
        assert!(save_impl(&db, &renderer, again).await.is_err());
    }

    #[tokio::test]
    async fn test_conflicting_flags_rejected() {
        let db = WikiDb::open_in_memory().await.unwrap();
        let bad = PageSaveParams { create_only: true, expected_modified: Some("t".into()), ..params("/a", "x") };
        assert!(save_impl(&db, &PageRenderer::new(), bad).await.is_err());
    }
}
