//! Page storage and the save workflow.
//!
//! A save reads the current row, renders the new content, writes the page
//! and replaces its outgoing crosslinks in a single `IMMEDIATE` transaction.
//! The write lock is taken before the read, so two saves of the same url
//! run one after the other and the stored page always matches its edges.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension, TransactionBehavior};

use super::connection::WikiDb;
use super::crosslinks::{Crosslink, select_incoming, select_outgoing, write_outgoing};
use crate::Error;
use crate::render::PageRenderer;

/// Url of the page created by [`WikiDb::ensure_index_page`].
pub const INDEX_URL: &str = "/";

const INDEX_TITLE: &str = "Welcome to crosswiki";
const INDEX_CONTENT: &str = include_str!("../../assets/default.md");

/// A stored wiki page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Page {
    pub url: String,
    pub title: String,
    /// Markdown source.
    pub content: String,
    /// Cached HTML produced from `content`.
    pub rendered: String,
    pub locked: bool,
    /// RFC 3339 UTC timestamp of the last save; also the edit stamp.
    pub modified: String,
    /// Link targets from the most recent render. Not stored in the database.
    #[serde(default)]
    pub links: Vec<String>,
}

impl Page {
    /// Render `content`, filling `rendered` and `links`.
    pub fn render(&mut self, renderer: &PageRenderer) -> &str {
        let rendered = renderer.render(&self.content);
        self.rendered = rendered.html;
        self.links = rendered.links;
        &self.rendered
    }
}

/// Page listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageSummary {
    pub url: String,
    pub title: String,
    pub modified: String,
}

/// A page together with its links in both directions.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PageInfo {
    pub page: Page,
    pub outgoing: Vec<Crosslink>,
    pub incoming: Vec<Crosslink>,
}

/// What the editor believes about the stored page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Expect {
    /// Save regardless of the stored state.
    #[default]
    Any,
    /// Only create; fail if the page exists.
    Missing,
    /// Only update the revision with this `modified` stamp.
    Modified(String),
}

/// A requested change to one page.
#[derive(Debug, Clone)]
pub struct PageEdit {
    pub url: String,
    /// Defaults to the stored title, or the url for a new page.
    pub title: Option<String>,
    pub content: String,
    pub locked: bool,
    pub expect: Expect,
    /// Allow editing a locked page. The host sets this after its own owner check.
    pub unlock_override: bool,
}

impl PageEdit {
    pub fn new(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            content: content.into(),
            locked: false,
            expect: Expect::Any,
            unlock_override: false,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn expect(mut self, expect: Expect) -> Self {
        self.expect = expect;
        self
    }

    pub fn unlock_override(mut self, allow: bool) -> Self {
        self.unlock_override = allow;
        self
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SavedPage {
    pub page: Page,
    /// True if the page did not exist before.
    pub created: bool,
}

/// Reject urls that are not rooted paths.
pub fn validate_page_url(url: &str) -> Result<(), Error> {
    if !url.starts_with('/') {
        return Err(Error::InvalidUrl(format!("{url:?} must start with '/'")));
    }
    if url.chars().any(char::is_control) {
        return Err(Error::InvalidUrl(format!("{url:?} contains control characters")));
    }
    Ok(())
}

/// Stamp for a new revision, strictly later than `previous`.
///
/// Two saves inside one clock tick would otherwise share a stamp and defeat
/// the `Expect::Modified` check.
fn next_stamp(previous: Option<&str>) -> String {
    let mut now = Utc::now();
    if let Some(prev) = previous.and_then(|p| DateTime::parse_from_rfc3339(p).ok()) {
        let prev = prev.with_timezone(&Utc);
        if prev >= now {
            now = prev + TimeDelta::nanoseconds(1);
        }
    }
    now.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn select_page(conn: &rusqlite::Connection, url: &str) -> Result<Option<Page>, Error> {
    let mut stmt = conn.prepare_cached(
        "SELECT url, title, content, rendered, locked, modified FROM pages WHERE url = ?1",
    )?;
    stmt.query_row(params![url], |row| {
        Ok(Page {
            url: row.get(0)?,
            title: row.get(1)?,
            content: row.get(2)?,
            rendered: row.get(3)?,
            locked: row.get::<_, i32>(4)? == 1,
            modified: row.get(5)?,
            links: Vec::new(),
        })
    })
    .optional()
    .map_err(Error::from)
}

fn upsert_page(conn: &rusqlite::Connection, page: &Page) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO pages (url, title, content, rendered, locked, modified)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(url) DO UPDATE SET
            title = excluded.title,
            content = excluded.content,
            rendered = excluded.rendered,
            locked = excluded.locked,
            modified = excluded.modified",
        params![&page.url, &page.title, &page.content, &page.rendered, page.locked as i32, &page.modified],
    )?;
    Ok(())
}

/// Stale or create-only edits fail with `Conflict` before the lock is
/// considered, so a create-only edit of a locked page is still a conflict.
fn check_edit(edit: &PageEdit, current: Option<&Page>) -> Result<(), Error> {
    const ABSENT: &str = "<absent>";

    let conflict = |expected: &str, actual: &str| Error::Conflict {
        url: edit.url.clone(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    };

    match (&edit.expect, current) {
        (Expect::Missing, Some(page)) => return Err(conflict(ABSENT, &page.modified)),
        (Expect::Modified(expected), None) => return Err(conflict(expected, ABSENT)),
        (Expect::Modified(expected), Some(page)) if *expected != page.modified => {
            return Err(conflict(expected, &page.modified));
        }
        _ => {}
    }

    match current {
        Some(page) if page.locked && !edit.unlock_override => Err(Error::PageLocked(edit.url.clone())),
        _ => Ok(()),
    }
}

impl WikiDb {
    /// Get a page by url.
    ///
    /// Returns None if no page is stored there. `links` is left empty.
    pub async fn get_page(&self, url: &str) -> Result<Option<Page>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Page>, Error> { select_page(conn, &url) })
            .await
            .map_err(Error::from)
    }

    /// List all pages ordered by url.
    pub async fn list_pages(&self) -> Result<Vec<PageSummary>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<PageSummary>, Error> {
                let mut stmt = conn.prepare("SELECT url, title, modified FROM pages ORDER BY url")?;
                let rows = stmt.query_map([], |row| {
                    Ok(PageSummary { url: row.get(0)?, title: row.get(1)?, modified: row.get(2)? })
                })?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// A page with its outgoing and incoming crosslinks, read as one snapshot.
    pub async fn page_info(&self, url: &str) -> Result<Option<PageInfo>, Error> {
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<PageInfo>, Error> {
                let tx = conn.transaction()?;
                let Some(page) = select_page(&tx, &url)? else {
                    return Ok(None);
                };
                let outgoing = select_outgoing(&tx, &url)?;
                let incoming = select_incoming(&tx, &url)?;
                tx.commit()?;
                Ok(Some(PageInfo { page, outgoing, incoming }))
            })
            .await
            .map_err(Error::from)
    }

    /// Render and store a page, replacing its outgoing crosslinks.
    ///
    /// Page row and edges commit together or not at all. Fails with
    /// `Conflict` when `edit.expect` does not match the stored page and with
    /// `PageLocked` when the page is locked and the edit has no override.
    pub async fn save_page(&self, renderer: &PageRenderer, edit: PageEdit) -> Result<SavedPage, Error> {
        validate_page_url(&edit.url)?;
        let renderer = renderer.clone();
        let deadline = self.deadline();
        let expect = edit.expect.clone();

        let saved = self
            .conn
            .call(move |conn| -> Result<SavedPage, Error> {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let current = select_page(&tx, &edit.url)?;
                check_edit(&edit, current.as_ref())?;

                let title = edit
                    .title
                    .or_else(|| current.as_ref().map(|p| p.title.clone()))
                    .unwrap_or_else(|| edit.url.clone());
                let mut page = Page {
                    url: edit.url,
                    title,
                    content: edit.content,
                    rendered: String::new(),
                    locked: edit.locked,
                    modified: next_stamp(current.as_ref().map(|p| p.modified.as_str())),
                    links: Vec::new(),
                };
                page.render(&renderer);

                upsert_page(&tx, &page)?;
                write_outgoing(&tx, &page.url, &page.links)?;
                deadline.check("save_page")?;
                tx.commit()?;

                Ok(SavedPage { page, created: current.is_none() })
            })
            .await
            .map_err(Error::from);

        match &saved {
            Ok(s) => tracing::info!(
                url = %s.page.url,
                created = s.created,
                links = s.page.links.len(),
                "saved page"
            ),
            Err(e @ Error::Conflict { .. }) if matches!(expect, Expect::Missing) => {
                tracing::debug!(error = %e, "page already exists, create skipped")
            }
            Err(e @ Error::Conflict { .. }) => tracing::warn!(error = %e, "rejected stale page edit"),
            Err(_) => {}
        }
        saved
    }

    /// Delete a page and every edge leaving it.
    ///
    /// Edges pointing at the page are kept. Returns whether a page was removed.
    pub async fn delete_page(&self, url: &str) -> Result<bool, Error> {
        validate_page_url(url)?;
        let url = url.to_string();
        let deadline = self.deadline();

        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let removed = tx.execute("DELETE FROM pages WHERE url = ?1", params![&url])?;
                write_outgoing(&tx, &url, &[])?;
                deadline.check("delete_page")?;
                tx.commit()?;
                tracing::info!(url = %url, removed = removed > 0, "deleted page");
                Ok(removed > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Create the index page from bundled content if it does not exist yet.
    ///
    /// Returns true if the page was created.
    pub async fn ensure_index_page(&self, renderer: &PageRenderer) -> Result<bool, Error> {
        if self.get_page(INDEX_URL).await?.is_some() {
            return Ok(false);
        }

        let edit = PageEdit::new(INDEX_URL, INDEX_CONTENT)
            .title(INDEX_TITLE)
            .expect(Expect::Missing);

        match self.save_page(renderer, edit).await {
            Ok(_) => {
                tracing::info!("created index page");
                Ok(true)
            }
            Err(Error::Conflict { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
