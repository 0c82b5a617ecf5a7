//! Crosslink graph storage.
//!
//! Edges are partitioned by their `from` page. A page's outgoing edges are
//! only ever rewritten as a whole, inside one write transaction, so readers
//! see either the previous edge set or the new one.

use super::connection::WikiDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, TransactionBehavior};

/// A directed edge: `from`'s rendered content links to `to`.
///
/// `to` need not name an existing page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Crosslink {
    pub from: String,
    pub to: String,
}

/// Replace every edge leaving `from` with one edge per target, in order.
///
/// Must run inside a transaction owned by the caller.
pub(crate) fn write_outgoing(conn: &rusqlite::Connection, from: &str, targets: &[String]) -> Result<(), Error> {
    conn.execute("DELETE FROM crosslinks WHERE from_url = ?1", params![from])?;

    let mut stmt = conn.prepare_cached("INSERT INTO crosslinks (from_url, to_url, position) VALUES (?1, ?2, ?3)")?;
    for (position, to) in targets.iter().enumerate() {
        stmt.execute(params![from, to, position as i64])?;
    }
    Ok(())
}

pub(crate) fn select_outgoing(conn: &rusqlite::Connection, from: &str) -> Result<Vec<Crosslink>, Error> {
    let mut stmt =
        conn.prepare_cached("SELECT from_url, to_url FROM crosslinks WHERE from_url = ?1 ORDER BY position")?;
    let rows = stmt.query_map(params![from], |row| Ok(Crosslink { from: row.get(0)?, to: row.get(1)? }))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
}

pub(crate) fn select_incoming(conn: &rusqlite::Connection, to: &str) -> Result<Vec<Crosslink>, Error> {
    let mut stmt = conn.prepare_cached(
        "SELECT from_url, to_url FROM crosslinks WHERE to_url = ?1 ORDER BY from_url, position",
    )?;
    let rows = stmt.query_map(params![to], |row| Ok(Crosslink { from: row.get(0)?, to: row.get(1)? }))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
}

impl WikiDb {
    /// Atomically replace all outgoing edges of `from`.
    ///
    /// Either every previous edge is removed and every new edge is present,
    /// or, on any failure including a missed deadline, the previous edge set
    /// is left untouched. Duplicate targets are kept as separate edges.
    pub async fn replace_outgoing<I, S>(&self, from: &str, targets: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let from = from.to_string();
        let targets: Vec<String> = targets.into_iter().map(Into::into).collect();
        let deadline = self.deadline();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                write_outgoing(&tx, &from, &targets)?;
                deadline.check("replace_outgoing")?;
                tx.commit()?;
                tracing::debug!(from = %from, edges = targets.len(), "replaced outgoing crosslinks");
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// All edges leaving `from`, in the order of the last replace.
    pub async fn outgoing(&self, from: &str) -> Result<Vec<Crosslink>, Error> {
        let from = from.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<Crosslink>, Error> { select_outgoing(conn, &from) })
            .await
            .map_err(Error::from)
    }

    /// All edges pointing at `to` (backlinks), ordered by source page.
    pub async fn incoming(&self, to: &str) -> Result<Vec<Crosslink>, Error> {
        let to = to.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<Crosslink>, Error> { select_incoming(conn, &to) })
            .await
            .map_err(Error::from)
    }
}
