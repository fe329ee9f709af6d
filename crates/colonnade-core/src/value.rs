//! Value is the closed scalar vocabulary the engine maps onto columns.
//!
//! Its canonical wire encoding is tagged and order-preserving (sign-biased
//! integers, total-order floats) so encoded values can serve as row keys and
//! hash-discriminant input without a second normalization pass.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use thiserror::Error as ThisError;

///
/// ValueDecodeError
/// (decode / corruption boundary)
///

#[derive(Debug, ThisError)]
pub enum ValueDecodeError {
    #[error("corrupted value: empty payload")]
    Empty,

    #[error("corrupted value: invalid tag {tag}")]
    InvalidTag { tag: u8 },

    #[error("corrupted value: payload length {len} invalid for tag {tag}")]
    InvalidLength { tag: u8, len: usize },

    #[error("corrupted value: invalid utf-8 text")]
    InvalidText,

    #[error("corrupted value: invalid bool payload")]
    InvalidBool,
}

///
/// Value
///
/// Storage-normalized scalar carried by simple columns, collection elements,
/// map keys and primary keys.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    Bytes(#[serde(with = "serde_bytes")] Vec<u8>),
    Timestamp(u64),
    Unit,
}

impl Value {
    // ── Variant tags (DO NOT reorder) ────────────────────────────────
    pub(crate) const TAG_BOOL: u8 = 0;
    pub(crate) const TAG_INT: u8 = 1;
    pub(crate) const TAG_UINT: u8 = 2;
    pub(crate) const TAG_FLOAT: u8 = 3;
    pub(crate) const TAG_TEXT: u8 = 4;
    pub(crate) const TAG_BYTES: u8 = 5;
    pub(crate) const TAG_TIMESTAMP: u8 = 6;
    pub(crate) const TAG_UNIT: u8 = 7;

    const WORD_SIZE: usize = 8;

    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Uint(_) => ValueKind::Uint,
            Self::Float(_) => ValueKind::Float,
            Self::Text(_) => ValueKind::Text,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Timestamp(_) => ValueKind::Timestamp,
            Self::Unit => ValueKind::Unit,
        }
    }

    const fn tag(&self) -> u8 {
        match self {
            Self::Bool(_) => Self::TAG_BOOL,
            Self::Int(_) => Self::TAG_INT,
            Self::Uint(_) => Self::TAG_UINT,
            Self::Float(_) => Self::TAG_FLOAT,
            Self::Text(_) => Self::TAG_TEXT,
            Self::Bytes(_) => Self::TAG_BYTES,
            Self::Timestamp(_) => Self::TAG_TIMESTAMP,
            Self::Unit => Self::TAG_UNIT,
        }
    }

    /// Encode this value into its canonical tagged representation.
    ///
    /// Encoding is infallible; every variant has a defined wire form.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + Self::WORD_SIZE);
        buf.push(self.tag());

        match self {
            Self::Bool(v) => buf.push(u8::from(*v)),
            Self::Int(v) => {
                let biased = (*v).cast_unsigned() ^ (1u64 << 63);
                buf.extend_from_slice(&biased.to_be_bytes());
            }
            Self::Uint(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Self::Float(v) => buf.extend_from_slice(&total_order_bits(*v).to_be_bytes()),
            Self::Text(v) => buf.extend_from_slice(v.as_bytes()),
            Self::Bytes(v) => buf.extend_from_slice(v),
            Self::Timestamp(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Self::Unit => {}
        }

        buf
    }

    /// Decode a canonical representation produced by [`Value::to_bytes`].
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, ValueDecodeError> {
        let (&tag, payload) = bytes.split_first().ok_or(ValueDecodeError::Empty)?;

        let fixed_word = |payload: &[u8]| -> Result<[u8; Self::WORD_SIZE], ValueDecodeError> {
            payload
                .try_into()
                .map_err(|_| ValueDecodeError::InvalidLength {
                    tag,
                    len: payload.len(),
                })
        };

        match tag {
            Self::TAG_BOOL => match payload {
                [0] => Ok(Self::Bool(false)),
                [1] => Ok(Self::Bool(true)),
                _ => Err(ValueDecodeError::InvalidBool),
            },
            Self::TAG_INT => {
                let word = u64::from_be_bytes(fixed_word(payload)?);
                Ok(Self::Int((word ^ (1u64 << 63)).cast_signed()))
            }
            Self::TAG_UINT => Ok(Self::Uint(u64::from_be_bytes(fixed_word(payload)?))),
            Self::TAG_FLOAT => {
                let bits = u64::from_be_bytes(fixed_word(payload)?);
                Ok(Self::Float(from_total_order_bits(bits)))
            }
            Self::TAG_TEXT => String::from_utf8(payload.to_vec())
                .map(Self::Text)
                .map_err(|_| ValueDecodeError::InvalidText),
            Self::TAG_BYTES => Ok(Self::Bytes(payload.to_vec())),
            Self::TAG_TIMESTAMP => Ok(Self::Timestamp(u64::from_be_bytes(fixed_word(payload)?))),
            Self::TAG_UNIT => {
                if payload.is_empty() {
                    Ok(Self::Unit)
                } else {
                    Err(ValueDecodeError::InvalidLength {
                        tag,
                        len: payload.len(),
                    })
                }
            }
            _ => Err(ValueDecodeError::InvalidTag { tag }),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Bytes(v) => write!(f, "0x{}", hex(v)),
            Self::Timestamp(v) => write!(f, "@{v}"),
            Self::Unit => write!(f, "()"),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// IEEE-754 total-order transform: negative floats invert every bit,
// non-negative floats flip the sign bit.
const fn total_order_bits(v: f64) -> u64 {
    let bits = v.to_bits();
    if bits >> 63 == 1 { !bits } else { bits ^ (1u64 << 63) }
}

const fn from_total_order_bits(bits: u64) -> f64 {
    let raw = if bits >> 63 == 0 { !bits } else { bits ^ (1u64 << 63) };
    f64::from_bits(raw)
}

///
/// ValueKind
///
/// Runtime type shape declared by property metadata; a lossy projection of
/// application types onto the storage vocabulary.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ValueKind {
    Bool,
    Int,
    Uint,
    Float,
    Text,
    Bytes,
    Timestamp,
    Unit,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Text => "text",
            Self::Bytes => "bytes",
            Self::Timestamp => "timestamp",
            Self::Unit => "unit",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
