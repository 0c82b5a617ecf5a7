//! SQLite-backed storage for pages and the crosslink graph.
//!
//! Access is async via tokio-rusqlite. It provides:
//!
//! - Automatic schema migrations
//! - WAL mode for concurrent readers
//! - Atomic replacement of a page's outgoing edges
//! - A save workflow that keeps each page's rendered HTML and edges in step
//! - A deadline on every write, after which the transaction rolls back

pub mod connection;
pub mod crosslinks;
pub mod migrations;
pub mod pages;

pub use crate::Error;

pub use connection::WikiDb;
pub use crosslinks::Crosslink;
pub use pages::{Expect, INDEX_URL, Page, PageEdit, PageInfo, PageSummary, SavedPage, validate_page_url};
