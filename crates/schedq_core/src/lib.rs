//! Queue persistence core for scheduling systems.
//! This crate is the single source of truth for queue storage invariants.

pub mod codec;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use codec::{CodecError, CodecResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attribute::{AttrOp, AttributeEntry, AttributeKey};
pub use model::queue::{Queue, QueueType, QueueValidationError, QUEUE_NAME_MAX};
pub use repo::catalog::StatementCatalog;
pub use repo::cursor::QueueCursor;
pub use repo::queue_repo::{
    QueueRepository, RepoError, RepoResult, SaveDirective, SqliteQueueRepository,
};
pub use service::queue_service::QueueService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
