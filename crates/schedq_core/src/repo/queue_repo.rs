//! Queue repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Map queue domain objects to bound statement parameters and back.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate the queue and fully encode attributes before any
//!   parameter is bound; a codec failure never leaves a partial write.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Timestamps travel as integer epoch seconds with no further conversion.

use crate::codec::{self, CodecError};
use crate::db::DbError;
use crate::model::attribute::AttributeKey;
use crate::model::queue::{Queue, QueueType, QueueValidationError};
use crate::repo::catalog::{
    QueueColumns, StatementCatalog, DELETE_QUEUE, INSERT_QUEUE, REMOVE_QUEUE_ATTRS, SELECT_QUEUE,
    UPDATE_QUEUE_FULL, UPDATE_QUEUE_QUICK,
};
use crate::repo::cursor::QueueCursor;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for queue persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(QueueValidationError),
    Codec(CodecError),
    Db(DbError),
    /// Insert hit an existing queue name.
    Conflict(String),
    /// Update/delete matched no row, or a point read's caller required one.
    /// Explicit and matchable; callers decide whether it is fatal.
    NotFound(String),
    /// Statement registration failed; fatal to every later operation.
    Catalog {
        statement: &'static str,
        message: String,
    },
    CursorOutOfRange {
        index: usize,
        count: usize,
    },
    CursorClosed,
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Conflict(name) => write!(f, "queue already exists: {name}"),
            Self::NotFound(name) => write!(f, "queue not found: {name}"),
            Self::Catalog { statement, message } => {
                write!(f, "statement `{statement}` failed to register: {message}")
            }
            Self::CursorOutOfRange { index, count } => {
                write!(f, "cursor row {index} out of range for result of {count} rows")
            }
            Self::CursorClosed => write!(f, "cursor is closed"),
            Self::InvalidData(message) => write!(f, "invalid persisted queue data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QueueValidationError> for RepoError {
    fn from(value: QueueValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CodecError> for RepoError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Selects how much of the queue a save writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDirective {
    /// Insert a fresh row with the full attribute set.
    New,
    /// Replace scalar fields and the entire attribute list.
    Full,
    /// Update scalar fields only; stored attributes are never touched.
    Quick,
}

/// Repository interface for queue persistence.
pub trait QueueRepository {
    /// Persists the queue per the directive semantics.
    fn save(&self, queue: &Queue, directive: SaveDirective) -> RepoResult<()>;
    /// Loads one queue by name. `None` when no such row.
    fn load(&self, name: &str) -> RepoResult<Option<Queue>>;
    /// Removes the named attribute keys from the stored set.
    fn delete_attrs(&self, name: &str, keys: &[AttributeKey]) -> RepoResult<()>;
    /// Removes the queue row.
    fn delete(&self, name: &str) -> RepoResult<()>;
    /// Opens a cursor over all queues in creation order.
    fn find(&self) -> RepoResult<QueueCursor>;
}

/// SQLite-backed queue repository.
pub struct SqliteQueueRepository<'conn> {
    conn: &'conn Connection,
    catalog: StatementCatalog,
}

impl<'conn> SqliteQueueRepository<'conn> {
    /// Constructs a repository, registering the statement catalog on the
    /// connection first. Catalog failure means no repository.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let catalog = StatementCatalog::prepare(conn)?;
        Ok(Self { conn, catalog })
    }
}

impl QueueRepository for SqliteQueueRepository<'_> {
    fn save(&self, queue: &Queue, directive: SaveDirective) -> RepoResult<()> {
        queue.validate()?;

        match directive {
            SaveDirective::New => {
                let blob = codec::encode(&queue.attributes)?;
                let mut stmt = self.conn.prepare_cached(INSERT_QUEUE.sql)?;
                match stmt.execute(params![queue.name, queue.queue_type.code(), blob]) {
                    Ok(_) => Ok(()),
                    Err(err) if is_unique_violation(&err) => {
                        Err(RepoError::Conflict(queue.name.clone()))
                    }
                    Err(err) => Err(err.into()),
                }
            }
            SaveDirective::Full => {
                let blob = codec::encode(&queue.attributes)?;
                let mut stmt = self.conn.prepare_cached(UPDATE_QUEUE_FULL.sql)?;
                let changed = stmt.execute(params![queue.name, queue.queue_type.code(), blob])?;
                if changed == 0 {
                    return Err(RepoError::NotFound(queue.name.clone()));
                }
                Ok(())
            }
            SaveDirective::Quick => {
                let mut stmt = self.conn.prepare_cached(UPDATE_QUEUE_QUICK.sql)?;
                let changed = stmt.execute(params![queue.name, queue.queue_type.code()])?;
                if changed == 0 {
                    return Err(RepoError::NotFound(queue.name.clone()));
                }
                Ok(())
            }
        }
    }

    fn load(&self, name: &str) -> RepoResult<Option<Queue>> {
        let mut stmt = self.conn.prepare_cached(SELECT_QUEUE.sql)?;
        let mut rows = stmt.query([name])?;
        match rows.next()? {
            Some(row) => {
                let raw = read_raw_row(row, self.catalog.columns())?;
                Ok(Some(raw_to_queue(&raw)?))
            }
            None => Ok(None),
        }
    }

    fn delete_attrs(&self, name: &str, keys: &[AttributeKey]) -> RepoResult<()> {
        let key_blob = codec::encode_keys(keys)?;
        let mut stmt = self.conn.prepare_cached(REMOVE_QUEUE_ATTRS.sql)?;
        let changed = stmt.execute(params![name, key_blob])?;
        if changed == 0 {
            return Err(RepoError::NotFound(name.to_string()));
        }
        Ok(())
    }

    fn delete(&self, name: &str) -> RepoResult<()> {
        let mut stmt = self.conn.prepare_cached(DELETE_QUEUE.sql)?;
        let changed = stmt.execute([name])?;
        if changed == 0 {
            return Err(RepoError::NotFound(name.to_string()));
        }
        Ok(())
    }

    fn find(&self) -> RepoResult<QueueCursor> {
        QueueCursor::open(self.conn, &self.catalog)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// One result row before attribute decoding. The cursor materializes these;
/// decoding happens per `next_row` call.
#[derive(Debug, Clone)]
pub(crate) struct RawQueueRow {
    pub name: String,
    pub queue_type: i64,
    pub ctime: i64,
    pub mtime: i64,
    pub attributes: String,
}

pub(crate) fn read_raw_row(row: &Row<'_>, columns: QueueColumns) -> RepoResult<RawQueueRow> {
    Ok(RawQueueRow {
        name: row.get(columns.name)?,
        queue_type: row.get(columns.queue_type)?,
        ctime: row.get(columns.ctime)?,
        mtime: row.get(columns.mtime)?,
        attributes: row.get(columns.attributes)?,
    })
}

pub(crate) fn raw_to_queue(raw: &RawQueueRow) -> RepoResult<Queue> {
    let queue_type = QueueType::from_code(raw.queue_type).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "unknown queue type code `{}` in queues.queue_type",
            raw.queue_type
        ))
    })?;

    if raw.mtime < raw.ctime {
        return Err(RepoError::InvalidData(format!(
            "mtime {} precedes ctime {} for queue `{}`",
            raw.mtime, raw.ctime, raw.name
        )));
    }

    let attributes = codec::decode(&raw.attributes)?;
    let queue = Queue {
        name: raw.name.clone(),
        queue_type,
        ctime: raw.ctime,
        mtime: raw.mtime,
        attributes,
    };
    queue.validate()?;
    Ok(queue)
}
