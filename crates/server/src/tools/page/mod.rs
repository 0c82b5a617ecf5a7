//! Page-related MCP tools.
//!
//! This module provides tools for reading, saving and deleting wiki pages.

pub mod delete;
pub mod get;
pub mod list;
pub mod save;

pub use delete::{PageDeleteParams, delete_impl};
pub use get::{PageGetParams, get_impl};
pub use list::{PageListParams, list_impl};
pub use save::{PageSaveParams, save_impl};
