//! Flat text-array wire codec for queue attributes.
//!
//! # Responsibility
//! - Serialize attribute lists into the single-column blob persisted with
//!   each queue row, and decode that blob back losslessly.
//! - Provide the key-removal transform backing the `attrs_remove` SQL
//!   function.
//!
//! # Wire format
//! - The blob is `{` elements `}` with elements separated by `,`.
//! - A non-null element is double-quoted; `\` and `"` inside are escaped
//!   with a backslash. A null value is the bare token `NULL` (the literal
//!   string `"NULL"` stays quoted and therefore distinct).
//! - Each attribute contributes exactly two elements: key, then value. The
//!   key is `name` for plain attributes and `name.qualifier` for
//!   resource-qualified ones; names must not contain `.` so the key
//!   decomposition stays unambiguous.
//!
//! # Invariants
//! - `decode(encode(attrs))` preserves entries, order, qualifier presence
//!   and null values.
//! - All failures are detected before any store mutation is issued.

use crate::model::attribute::{AttrOp, AttributeEntry, AttributeKey};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Separator joining name and qualifier inside a wire key.
pub const QUALIFIER_SEP: char = '.';

pub type CodecResult<T> = Result<T, CodecError>;

/// Attribute wire-format error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Nothing to encode; writes of empty lists are rejected.
    EmptyList,
    EmptyName,
    /// Attribute names must not contain [`QUALIFIER_SEP`].
    SeparatorInName(String),
    DuplicateKey(String),
    /// `NULL` appeared in a key slot at the given element index.
    NullKey(usize),
    /// The array did not hold complete key/value pairs.
    OddElementCount(usize),
    Malformed {
        offset: usize,
        reason: &'static str,
    },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyList => write!(f, "attribute list is empty"),
            Self::EmptyName => write!(f, "attribute name is empty"),
            Self::SeparatorInName(name) => write!(
                f,
                "attribute name `{name}` contains the qualifier separator `{QUALIFIER_SEP}`"
            ),
            Self::DuplicateKey(key) => write!(f, "duplicate attribute key `{key}`"),
            Self::NullKey(index) => write!(f, "NULL in key slot at element {index}"),
            Self::OddElementCount(count) => write!(
                f,
                "flat array holds {count} elements, expected complete key/value pairs"
            ),
            Self::Malformed { offset, reason } => {
                write!(f, "malformed attribute array at byte {offset}: {reason}")
            }
        }
    }
}

impl Error for CodecError {}

/// Serializes an attribute list into the wire blob.
///
/// The write path requires at least one entry and unique (name, qualifier)
/// keys; violations fail before any parameter is bound.
pub fn encode(attrs: &[AttributeEntry]) -> CodecResult<String> {
    if attrs.is_empty() {
        return Err(CodecError::EmptyList);
    }

    let mut seen = BTreeSet::new();
    let mut elements = Vec::with_capacity(attrs.len() * 2);
    for entry in attrs {
        let key = wire_key(&entry.name, entry.qualifier.as_deref())?;
        if !seen.insert(key.clone()) {
            return Err(CodecError::DuplicateKey(key));
        }
        elements.push(Some(key));
        elements.push(entry.value.clone());
    }

    Ok(write_elements(&elements))
}

/// Decodes a wire blob into attribute entries.
///
/// The empty array `{}` decodes to an empty list; callers distinguish "zero
/// attributes" from "decode failure" by the `Result`. Operation flags are
/// not part of the wire format, so every decoded entry carries
/// [`AttrOp::Set`].
pub fn decode(wire: &str) -> CodecResult<Vec<AttributeEntry>> {
    let elements = parse_elements(wire)?;
    if elements.len() % 2 != 0 {
        return Err(CodecError::OddElementCount(elements.len()));
    }

    let mut attrs = Vec::with_capacity(elements.len() / 2);
    for (pair_index, pair) in elements.chunks_exact(2).enumerate() {
        let key = pair[0]
            .as_deref()
            .ok_or(CodecError::NullKey(pair_index * 2))?;
        let (name, qualifier) = split_key(key);
        if name.is_empty() {
            return Err(CodecError::EmptyName);
        }
        attrs.push(AttributeEntry {
            name,
            qualifier,
            value: pair[1].clone(),
            op: AttrOp::Set,
        });
    }

    Ok(attrs)
}

/// Serializes a removal key list: one element per (name, qualifier) key.
pub fn encode_keys(keys: &[AttributeKey]) -> CodecResult<String> {
    if keys.is_empty() {
        return Err(CodecError::EmptyList);
    }

    let mut seen = BTreeSet::new();
    let mut elements = Vec::with_capacity(keys.len());
    for key in keys {
        let wire = wire_key(&key.name, key.qualifier.as_deref())?;
        if !seen.insert(wire.clone()) {
            return Err(CodecError::DuplicateKey(wire));
        }
        elements.push(Some(wire));
    }

    Ok(write_elements(&elements))
}

/// Decodes a removal key list produced by [`encode_keys`].
pub fn decode_keys(wire: &str) -> CodecResult<Vec<AttributeKey>> {
    let elements = parse_elements(wire)?;
    let mut keys = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        let key = element.as_deref().ok_or(CodecError::NullKey(index))?;
        let (name, qualifier) = split_key(key);
        if name.is_empty() {
            return Err(CodecError::EmptyName);
        }
        keys.push(AttributeKey { name, qualifier });
    }
    Ok(keys)
}

/// Subtracts the named keys from a stored blob; unknown keys are ignored.
///
/// The result may be the empty array `{}`. Backs the `attrs_remove` SQL
/// function registered by the statement catalog.
pub fn remove_keys(attrs_wire: &str, keys_wire: &str) -> CodecResult<String> {
    let attrs = decode(attrs_wire)?;
    let drop: BTreeSet<AttributeKey> = decode_keys(keys_wire)?.into_iter().collect();

    let mut elements = Vec::new();
    for entry in attrs {
        if drop.contains(&entry.key()) {
            continue;
        }
        elements.push(Some(wire_key(&entry.name, entry.qualifier.as_deref())?));
        elements.push(entry.value);
    }
    Ok(write_elements(&elements))
}

fn wire_key(name: &str, qualifier: Option<&str>) -> CodecResult<String> {
    if name.is_empty() {
        return Err(CodecError::EmptyName);
    }
    if name.contains(QUALIFIER_SEP) {
        return Err(CodecError::SeparatorInName(name.to_string()));
    }
    Ok(match qualifier {
        Some(qualifier) => format!("{name}{QUALIFIER_SEP}{qualifier}"),
        None => name.to_string(),
    })
}

fn split_key(key: &str) -> (String, Option<String>) {
    match key.split_once(QUALIFIER_SEP) {
        Some((name, qualifier)) => (name.to_string(), Some(qualifier.to_string())),
        None => (key.to_string(), None),
    }
}

fn write_elements(elements: &[Option<String>]) -> String {
    let mut out = String::from("{");
    for (index, element) in elements.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        match element {
            None => out.push_str("NULL"),
            Some(text) => {
                out.push('"');
                for c in text.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
            }
        }
    }
    out.push('}');
    out
}

fn parse_elements(wire: &str) -> CodecResult<Vec<Option<String>>> {
    let mut chars = wire.char_indices().peekable();

    match chars.next() {
        Some((_, '{')) => {}
        _ => {
            return Err(CodecError::Malformed {
                offset: 0,
                reason: "expected `{`",
            })
        }
    }

    let mut elements = Vec::new();
    if matches!(chars.peek(), Some((_, '}'))) {
        chars.next();
        return match chars.next() {
            None => Ok(elements),
            Some((offset, _)) => Err(CodecError::Malformed {
                offset,
                reason: "trailing data after `}`",
            }),
        };
    }

    loop {
        match chars.next() {
            Some((_, '"')) => {
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\\')) => match chars.next() {
                            Some((_, escaped @ ('\\' | '"'))) => text.push(escaped),
                            Some((offset, _)) => {
                                return Err(CodecError::Malformed {
                                    offset,
                                    reason: "invalid escape sequence",
                                })
                            }
                            None => {
                                return Err(CodecError::Malformed {
                                    offset: wire.len(),
                                    reason: "unterminated escape",
                                })
                            }
                        },
                        Some((_, '"')) => break,
                        Some((_, c)) => text.push(c),
                        None => {
                            return Err(CodecError::Malformed {
                                offset: wire.len(),
                                reason: "unterminated quoted element",
                            })
                        }
                    }
                }
                elements.push(Some(text));
            }
            Some((offset, 'N')) => {
                for expected in ['U', 'L', 'L'] {
                    match chars.next() {
                        Some((_, c)) if c == expected => {}
                        _ => {
                            return Err(CodecError::Malformed {
                                offset,
                                reason: "expected NULL literal",
                            })
                        }
                    }
                }
                elements.push(None);
            }
            Some((offset, _)) => {
                return Err(CodecError::Malformed {
                    offset,
                    reason: "expected quoted element or NULL",
                })
            }
            None => {
                return Err(CodecError::Malformed {
                    offset: wire.len(),
                    reason: "unterminated array",
                })
            }
        }

        match chars.next() {
            Some((_, ',')) => continue,
            Some((_, '}')) => break,
            Some((offset, _)) => {
                return Err(CodecError::Malformed {
                    offset,
                    reason: "expected `,` or `}`",
                })
            }
            None => {
                return Err(CodecError::Malformed {
                    offset: wire.len(),
                    reason: "unterminated array",
                })
            }
        }
    }

    match chars.next() {
        None => Ok(elements),
        Some((offset, _)) => Err(CodecError::Malformed {
            offset,
            reason: "trailing data after `}`",
        }),
    }
}
