//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep admin/scheduler callers decoupled from storage details.

pub mod queue_service;
