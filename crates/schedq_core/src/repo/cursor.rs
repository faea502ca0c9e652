//! Cursor protocol over the ordered bulk queue query.
//!
//! # Responsibility
//! - Materialize the full result of the bulk select at open time.
//! - Expose one row at a time by caller-supplied index.
//!
//! # Invariants
//! - Row order is creation time ascending, name ascending; stable across
//!   identical stores.
//! - `close` is idempotent; a closed cursor rejects row access instead of
//!   exposing stale data.

use crate::model::queue::Queue;
use crate::repo::catalog::{StatementCatalog, SELECT_QUEUES_BY_CTIME};
use crate::repo::queue_repo::{read_raw_row, raw_to_queue, RawQueueRow, RepoError, RepoResult};
use rusqlite::Connection;

/// Stateful handle over one materialized bulk result.
///
/// The caller drives iteration: any index in `[0, count())` may be fetched,
/// in any order. Attribute decoding happens per fetch, so a corrupt row
/// surfaces on access rather than poisoning the whole scan.
#[derive(Debug)]
pub struct QueueCursor {
    /// `None` once closed.
    rows: Option<Vec<RawQueueRow>>,
}

impl QueueCursor {
    /// Runs the ordered bulk select and captures every row plus the count.
    /// No cursor is created when the query fails.
    pub(crate) fn open(conn: &Connection, catalog: &StatementCatalog) -> RepoResult<Self> {
        let mut stmt = conn.prepare_cached(SELECT_QUEUES_BY_CTIME.sql)?;
        let columns = catalog.columns();
        let mut rows = stmt.query([])?;

        let mut raw = Vec::new();
        while let Some(row) = rows.next()? {
            raw.push(read_raw_row(row, columns)?);
        }
        Ok(Self { rows: Some(raw) })
    }

    /// Total rows captured at open time. Zero after `close`.
    pub fn count(&self) -> usize {
        self.rows.as_ref().map_or(0, Vec::len)
    }

    pub fn is_closed(&self) -> bool {
        self.rows.is_none()
    }

    /// Decodes the row at `index` into a fresh queue object.
    pub fn next_row(&self, index: usize) -> RepoResult<Queue> {
        let rows = self.rows.as_ref().ok_or(RepoError::CursorClosed)?;
        let raw = rows.get(index).ok_or(RepoError::CursorOutOfRange {
            index,
            count: rows.len(),
        })?;
        raw_to_queue(raw)
    }

    /// Releases the materialized result. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.rows = None;
    }
}
