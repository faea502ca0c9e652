//! Repository layer: statement catalog, object mapper and cursor protocol.
//!
//! # Responsibility
//! - Define the queue persistence contract and its SQLite implementation.
//! - Isolate SQL templates and row decoding from service orchestration.
//!
//! # Invariants
//! - The statement catalog is registered before any CRUD call.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to DB transport errors.

pub mod catalog;
pub mod cursor;
pub mod queue_repo;
