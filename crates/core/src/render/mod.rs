//! Page render pipeline.
//!
//! Stored page content is Markdown. Rendering transpiles it to HTML and then
//! rewrites wiki-link tokens in that HTML, collecting the link targets that
//! feed the crosslink graph:
//!
//! ```text
//! content -> MarkdownTranspiler -> parse_wikilinks -> RenderedPage { html, links }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use pulldown_cmark::{Options, Parser, html};

use crate::config::AppConfig;

pub mod wikilink;

pub use wikilink::{ParsedLinks, parse_wikilinks};

/// Converts Markdown source to HTML.
///
/// Implementations escape raw text as needed; the wiki-link pass that runs
/// afterwards copies targets and titles into anchors without escaping.
pub trait MarkdownTranspiler: Send + Sync {
    fn to_html(&self, markdown: &str) -> String;
}

/// GitHub-flavoured Markdown via pulldown-cmark.
///
/// pulldown-cmark's own wiki-link extension stays off so `[[...]]` reaches
/// [`parse_wikilinks`] as literal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct GfmTranspiler;

impl GfmTranspiler {
    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);
        options
    }
}

impl MarkdownTranspiler for GfmTranspiler {
    fn to_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, Self::options());
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

/// Result of rendering one page's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    pub html: String,
    /// Link targets (`/target`) in order of appearance.
    pub links: Vec<String>,
}

/// Renders page content into HTML plus its outgoing link list.
///
/// Holds no per-page state; one renderer is shared by every save.
#[derive(Clone)]
pub struct PageRenderer {
    transpiler: Arc<dyn MarkdownTranspiler>,
    dedupe_links: bool,
}

impl fmt::Debug for PageRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRenderer")
            .field("dedupe_links", &self.dedupe_links)
            .finish_non_exhaustive()
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRenderer {
    /// Renderer using [`GfmTranspiler`], keeping duplicate links.
    pub fn new() -> Self {
        Self::with_transpiler(GfmTranspiler)
    }

    /// Renderer using a custom Markdown transpiler.
    pub fn with_transpiler(transpiler: impl MarkdownTranspiler + 'static) -> Self {
        Self { transpiler: Arc::new(transpiler), dedupe_links: false }
    }

    /// Renderer configured from [`AppConfig`].
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new().dedupe_links(config.dedupe_links)
    }

    /// Keep only the first occurrence of each link target.
    pub fn dedupe_links(mut self, dedupe: bool) -> Self {
        self.dedupe_links = dedupe;
        self
    }

    /// Transpile `content` and rewrite its wiki-links.
    pub fn render(&self, content: &str) -> RenderedPage {
        let transpiled = self.transpiler.to_html(content);
        let ParsedLinks { html, mut links } = parse_wikilinks(&transpiled);

        if self.dedupe_links {
            let mut seen = HashSet::new();
            links.retain(|link| seen.insert(link.clone()));
        }

        tracing::debug!(links = links.len(), bytes = html.len(), "rendered page content");
        RenderedPage { html, links }
    }
}
