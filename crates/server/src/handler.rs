//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::{
    CrosslinksParams, PageDeleteParams, PageGetParams, PageListParams, PageSaveParams, WikiRenderParams,
    crosslinks::crosslinks_impl, page, wiki_render::render_impl,
};

use crosswiki_core::{PageRenderer, WikiDb};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for crosswiki.
///
/// Holds the database handle and renderer every tool call shares.
#[derive(Clone)]
pub struct CrosswikiServer {
    db: WikiDb,
    renderer: PageRenderer,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl CrosswikiServer {
    /// Create a new server handler.
    pub fn new(db: WikiDb, renderer: PageRenderer) -> Self {
        Self { db, renderer, tool_router: Self::tool_router() }
    }

    /// Render wiki Markdown to HTML without saving it.
    #[tool(description = "Render wiki Markdown to HTML. [[target]] and [[target|title]] become links to /target; \
                          ![[...]] keeps the brackets literally. Returns the HTML and the ordered link targets. \
                          Nothing is stored.")]
    async fn wiki_render(&self, params: Parameters<WikiRenderParams>) -> Result<CallToolResult, McpError> {
        render_impl(&self.renderer, params.0).await
    }

    /// Fetch a page with its crosslinks.
    #[tool(description = "Get a wiki page by url, with the links it makes (outgoing) and the pages linking to it \
                          (incoming).")]
    async fn page_get(&self, params: Parameters<PageGetParams>) -> Result<CallToolResult, McpError> {
        page::get_impl(&self.db, params.0).await
    }

    /// Save a page.
    #[tool(description = "Create or update a wiki page. Renders the Markdown content and replaces the page's \
                          outgoing links atomically. Pass expected_modified from a previous read to reject the \
                          save if someone else edited the page in between.")]
    async fn page_save(&self, params: Parameters<PageSaveParams>) -> Result<CallToolResult, McpError> {
        page::save_impl(&self.db, &self.renderer, params.0).await
    }

    /// Delete a page.
    #[tool(description = "Delete a wiki page and the links it makes. Links from other pages to it are kept.")]
    async fn page_delete(&self, params: Parameters<PageDeleteParams>) -> Result<CallToolResult, McpError> {
        page::delete_impl(&self.db, params.0).await
    }

    /// List pages.
    #[tool(description = "List every wiki page with its title and last-modified stamp, ordered by url.")]
    async fn page_list(&self, params: Parameters<PageListParams>) -> Result<CallToolResult, McpError> {
        page::list_impl(&self.db, params.0).await
    }

    /// Query the link graph.
    #[tool(description = "List crosslinks around a url: outgoing (links it makes), incoming (backlinks) or both. \
                          Works for urls with no page yet.")]
    async fn crosslinks(&self, params: Parameters<CrosslinksParams>) -> Result<CallToolResult, McpError> {
        crosslinks_impl(&self.db, params.0).await
    }
}

impl ServerHandler for CrosswikiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "crosswiki".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
