//! Queue domain model.
//!
//! # Responsibility
//! - Define the canonical scheduling-queue record persisted by this core.
//! - Validate queue identity before any SQL mutation.
//!
//! # Invariants
//! - `name` is the unique identity of a queue and never changes.
//! - `ctime`/`mtime` are store-assigned; client-side values are overwritten
//!   on load and ignored by the write path.
//! - `mtime >= ctime` for every persisted row.

use crate::model::attribute::AttributeEntry;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum queue name length in bytes, matching the scheduler's limit.
pub const QUEUE_NAME_MAX: usize = 15;

static QUEUE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("valid queue name regex"));

/// Queue category, stored as a small integer wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueType {
    /// Jobs are executed from this queue.
    Execution,
    /// Jobs are routed onward to other queues.
    Route,
}

impl QueueType {
    /// Integer code used in the persisted row.
    pub fn code(self) -> i64 {
        match self {
            Self::Execution => 1,
            Self::Route => 2,
        }
    }

    /// Inverse of [`QueueType::code`]. Unknown codes are rejected, not
    /// defaulted.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Execution),
            2 => Some(Self::Route),
            _ => None,
        }
    }
}

/// Canonical queue record with scalar metadata and a dynamic attribute set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    /// Unique queue name, the row key.
    pub name: String,
    /// Serialized as `queue_type` to match the persisted column.
    pub queue_type: QueueType,
    /// Creation time, seconds since epoch. Store-assigned.
    pub ctime: i64,
    /// Last modification time, seconds since epoch. Store-assigned.
    pub mtime: i64,
    /// Dynamic attribute set (resource limits, ACLs, flags).
    pub attributes: Vec<AttributeEntry>,
}

/// Validation failure raised before any persistence side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueValidationError {
    EmptyName,
    NameTooLong { name: String, max: usize },
    InvalidName { name: String },
}

impl Display for QueueValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "queue name is empty"),
            Self::NameTooLong { name, max } => {
                write!(f, "queue name `{name}` exceeds {max} bytes")
            }
            Self::InvalidName { name } => write!(
                f,
                "queue name `{name}` must start with a letter followed by letters, digits, `_` or `-`"
            ),
        }
    }
}

impl Error for QueueValidationError {}

impl Queue {
    /// Creates a queue record with empty attributes and unset timestamps.
    ///
    /// Timestamps stay zero until the store assigns them on save/load.
    pub fn new(name: impl Into<String>, queue_type: QueueType) -> Self {
        Self {
            name: name.into(),
            queue_type,
            ctime: 0,
            mtime: 0,
            attributes: Vec::new(),
        }
    }

    /// Checks the queue-name rule shared by every write path.
    pub fn validate(&self) -> Result<(), QueueValidationError> {
        if self.name.is_empty() {
            return Err(QueueValidationError::EmptyName);
        }
        if self.name.len() > QUEUE_NAME_MAX {
            return Err(QueueValidationError::NameTooLong {
                name: self.name.clone(),
                max: QUEUE_NAME_MAX,
            });
        }
        if !QUEUE_NAME_RE.is_match(&self.name) {
            return Err(QueueValidationError::InvalidName {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}
