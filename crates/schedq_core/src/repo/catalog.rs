//! Statement catalog: the fixed set of named query templates.
//!
//! # Responsibility
//! - Declare every SQL template used by queue persistence, with its
//!   parameter arity.
//! - Register the `attrs_remove` SQL function and verify that every
//!   template compiles, once per connection, before any CRUD call.
//!
//! # Invariants
//! - Registration happens before any other queue operation; repository
//!   construction implies a prepared catalog.
//! - The result column layout is resolved here, once, and carried in the
//!   catalog value. No per-call column lookups, no hidden static state.

use crate::codec;
use crate::repo::queue_repo::{RepoError, RepoResult};
use log::info;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// One named query template with its declared parameter arity.
#[derive(Debug, Clone, Copy)]
pub struct StatementDef {
    pub name: &'static str,
    pub sql: &'static str,
    pub params: usize,
}

pub const INSERT_QUEUE: StatementDef = StatementDef {
    name: "insert_queue",
    sql: "INSERT INTO queues (name, queue_type, ctime, mtime, attributes) \
          VALUES (?1, ?2, CAST(strftime('%s','now') AS INTEGER), \
          CAST(strftime('%s','now') AS INTEGER), ?3);",
    params: 3,
};

/// Rewrites scalar fields and the entire attribute blob.
pub const UPDATE_QUEUE_FULL: StatementDef = StatementDef {
    name: "update_queue_full",
    sql: "UPDATE queues SET queue_type = ?2, \
          mtime = CAST(strftime('%s','now') AS INTEGER), \
          attributes = ?3 WHERE name = ?1;",
    params: 3,
};

/// Scalar fields only; the stored attribute blob is untouched.
pub const UPDATE_QUEUE_QUICK: StatementDef = StatementDef {
    name: "update_queue_quick",
    sql: "UPDATE queues SET queue_type = ?2, \
          mtime = CAST(strftime('%s','now') AS INTEGER) WHERE name = ?1;",
    params: 2,
};

/// Subtracts an encoded key list from the stored attribute set.
pub const REMOVE_QUEUE_ATTRS: StatementDef = StatementDef {
    name: "remove_queue_attrs",
    sql: "UPDATE queues SET mtime = CAST(strftime('%s','now') AS INTEGER), \
          attributes = attrs_remove(attributes, ?2) WHERE name = ?1;",
    params: 2,
};

pub const SELECT_QUEUE: StatementDef = StatementDef {
    name: "select_queue",
    sql: "SELECT name, queue_type, ctime, mtime, attributes \
          FROM queues WHERE name = ?1;",
    params: 1,
};

/// Creation-time order with name as tiebreaker keeps cursor iteration
/// deterministic across second-resolution ctime collisions.
pub const SELECT_QUEUES_BY_CTIME: StatementDef = StatementDef {
    name: "select_queues_by_ctime",
    sql: "SELECT name, queue_type, ctime, mtime, attributes \
          FROM queues ORDER BY ctime ASC, name ASC;",
    params: 0,
};

pub const DELETE_QUEUE: StatementDef = StatementDef {
    name: "delete_queue",
    sql: "DELETE FROM queues WHERE name = ?1;",
    params: 1,
};

const STATEMENTS: &[StatementDef] = &[
    INSERT_QUEUE,
    UPDATE_QUEUE_FULL,
    UPDATE_QUEUE_QUICK,
    REMOVE_QUEUE_ATTRS,
    SELECT_QUEUE,
    SELECT_QUEUES_BY_CTIME,
    DELETE_QUEUE,
];

/// Result column indexes shared by both select templates.
#[derive(Debug, Clone, Copy)]
pub struct QueueColumns {
    pub name: usize,
    pub queue_type: usize,
    pub ctime: usize,
    pub mtime: usize,
    pub attributes: usize,
}

/// Prepared-catalog evidence: holding one means every template compiled,
/// arities matched, and `attrs_remove` is registered on the connection.
#[derive(Debug, Clone, Copy)]
pub struct StatementCatalog {
    columns: QueueColumns,
}

impl StatementCatalog {
    /// Registers all templates on the connection. Fails fast on the first
    /// template that does not compile or whose declared arity disagrees
    /// with the compiled statement.
    pub fn prepare(conn: &Connection) -> RepoResult<Self> {
        register_attrs_remove(conn).map_err(|err| RepoError::Catalog {
            statement: "attrs_remove",
            message: err.to_string(),
        })?;

        for def in STATEMENTS {
            let stmt = conn.prepare_cached(def.sql).map_err(|err| RepoError::Catalog {
                statement: def.name,
                message: err.to_string(),
            })?;
            let bound = stmt.parameter_count();
            if bound != def.params {
                return Err(RepoError::Catalog {
                    statement: def.name,
                    message: format!("declares {} parameters, statement binds {bound}", def.params),
                });
            }
        }

        let columns = resolve_columns(conn)?;
        info!(
            "event=catalog_prepare module=repo status=ok statements={}",
            STATEMENTS.len()
        );
        Ok(Self { columns })
    }

    pub fn columns(&self) -> QueueColumns {
        self.columns
    }
}

fn resolve_columns(conn: &Connection) -> RepoResult<QueueColumns> {
    let stmt = conn
        .prepare_cached(SELECT_QUEUE.sql)
        .map_err(|err| RepoError::Catalog {
            statement: SELECT_QUEUE.name,
            message: err.to_string(),
        })?;

    let index = |column: &str| {
        stmt.column_index(column).map_err(|err| RepoError::Catalog {
            statement: SELECT_QUEUE.name,
            message: format!("column `{column}`: {err}"),
        })
    };

    Ok(QueueColumns {
        name: index("name")?,
        queue_type: index("queue_type")?,
        ctime: index("ctime")?,
        mtime: index("mtime")?,
        attributes: index("attributes")?,
    })
}

fn register_attrs_remove(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "attrs_remove",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let stored: String = ctx.get(0)?;
            let keys: String = ctx.get(1)?;
            codec::remove_keys(&stored, &keys)
                .map_err(|err| rusqlite::Error::UserFunctionError(Box::new(err)))
        },
    )
}
