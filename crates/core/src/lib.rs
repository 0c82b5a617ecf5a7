//! Core types and shared functionality for crosswiki.
//!
//! This crate provides:
//! - The render pipeline (Markdown transpile + wiki-link parsing)
//! - Page and crosslink storage with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod render;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use render::{GfmTranspiler, MarkdownTranspiler, PageRenderer, RenderedPage, parse_wikilinks};
pub use store::{Crosslink, Expect, Page, PageEdit, PageInfo, PageSummary, SavedPage, WikiDb};
