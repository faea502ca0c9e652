//! Domain model for scheduling queues.
//!
//! # Responsibility
//! - Define the canonical queue record and its dynamic attribute shape.
//! - Keep identity/validation rules next to the data they protect.
//!
//! # Invariants
//! - Every queue is identified by its unique `name`.
//! - Timestamps are store-assigned, never trusted from callers.

pub mod attribute;
pub mod queue;
