//! Dynamic queue attribute entries.
//!
//! # Responsibility
//! - Define the open-ended (name, qualifier, value) attribute shape carried
//!   by every queue record.
//!
//! # Invariants
//! - (name, qualifier) pairs are unique within one list per write operation;
//!   the wire codec enforces this at encode time.
//! - `value: None` on read means "present with no value", which is distinct
//!   from the attribute being absent from the list.

use serde::{Deserialize, Serialize};

/// Write-path operation flag. Ignored on read: decoded entries always carry
/// [`AttrOp::Set`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrOp {
    #[default]
    Set,
    Unset,
    Incr,
    Decr,
}

/// One configurable queue property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEntry {
    /// Attribute name, e.g. `max_running` or `resources_max`.
    pub name: String,
    /// Sub-resource the value applies to, e.g. `ncpus`. `None` for plain
    /// attributes.
    pub qualifier: Option<String>,
    /// Caller-defined string encoding of the attribute value.
    pub value: Option<String>,
    /// Write-path operation flag.
    pub op: AttrOp,
}

impl AttributeEntry {
    /// Plain attribute assignment without a qualifier.
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualifier: None,
            value: Some(value.into()),
            op: AttrOp::Set,
        }
    }

    /// Resource-qualified assignment, e.g. `resources_max.ncpus = 8`.
    pub fn resource(
        name: impl Into<String>,
        qualifier: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            qualifier: Some(qualifier.into()),
            value: Some(value.into()),
            op: AttrOp::Set,
        }
    }

    /// Removal key identifying this entry.
    pub fn key(&self) -> AttributeKey {
        AttributeKey {
            name: self.name.clone(),
            qualifier: self.qualifier.clone(),
        }
    }
}

/// (name, qualifier) pair naming an attribute for partial removal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeKey {
    pub name: String,
    pub qualifier: Option<String>,
}

impl AttributeKey {
    /// Key for a plain attribute.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualifier: None,
        }
    }

    /// Key for a resource-qualified attribute.
    pub fn resource(name: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualifier: Some(qualifier.into()),
        }
    }
}
