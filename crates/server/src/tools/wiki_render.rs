//! wiki_render tool implementation.
//!
//! Renders Markdown with wiki-links to HTML without storing anything.

use crosswiki_core::PageRenderer;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for wiki_render tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WikiRenderParams {
    /// Markdown source, may contain `[[target]]` or `[[target|title]]` links.
    pub content: String,
}

/// Output structure for wiki_render tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WikiRenderOutput {
    /// Rendered HTML.
    pub html: String,
    /// Link targets in order of appearance.
    pub links: Vec<String>,
}

/// Implementation of the wiki_render tool.
pub async fn render_impl(renderer: &PageRenderer, params: WikiRenderParams) -> Result<CallToolResult, McpError> {
    let rendered = renderer.render(&params.content);
    json_result(&WikiRenderOutput { html: rendered.html, links: rendered.links })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::output;

    #[tokio::test]
    async fn test_render_preview() {
        let params = WikiRenderParams { content: "go to [[Home|home]]".into() };
        let result = render_impl(&PageRenderer::new(), params).await.unwrap();

        let out: WikiRenderOutput = output(&result);
        assert_eq!(out.html, "<p>go to <a href=\"/Home\">home</a></p>\n");
        assert_eq!(out.links, vec!["/Home"]);
    }

    #[tokio::test]
    async fn test_render_empty_content() {
        let params = WikiRenderParams { content: String::new() };
        let out: WikiRenderOutput = output(&render_impl(&PageRenderer::new(), params).await.unwrap());

        assert_eq!(out.html, "");
        assert!(out.links.is_empty());
    }
}
