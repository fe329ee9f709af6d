use crate::{
    error::InternalError,
    serialize::{deserialize, serialize},
    value::{Value, ValueKind},
};
use thiserror::Error as ThisError;

///
/// CodecError
/// (encode boundary — fatal per operation, the store is never reached)
///

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("text codec cannot represent {kind} values")]
    UnsupportedTextKind { kind: ValueKind },

    #[error("text codec cannot parse '{text}' as {kind}")]
    UnparsableText { kind: ValueKind, text: String },

    #[error("column value decode failed: {0}")]
    Binary(String),

    #[error("decoded {found} where {expected} was declared")]
    KindMismatch {
        expected: ValueKind,
        found: ValueKind,
    },
}

impl From<CodecError> for InternalError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Binary(_) | CodecError::KindMismatch { .. } => {
                Self::codec_corruption(err.to_string())
            }
            _ => Self::encoding(err.to_string()),
        }
    }
}

///
/// ColumnCodec
///
/// Serializes one scalar value to and from the store's column-value
/// representation. `Text` stores the canonical string form (human-readable
/// rows, scalar kinds only); `Cbor` stores the tagged binary form and
/// accepts every kind.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ColumnCodec {
    Text,
    Cbor,
}

impl ColumnCodec {
    /// Encode a value into column bytes.
    pub fn encode(self, value: &Value) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Text => match value {
                Value::Text(v) => Ok(v.clone().into_bytes()),
                Value::Bool(_)
                | Value::Int(_)
                | Value::Uint(_)
                | Value::Float(_)
                | Value::Timestamp(_) => Ok(value.to_string().into_bytes()),
                Value::Bytes(_) | Value::Unit => Err(CodecError::UnsupportedTextKind {
                    kind: value.kind(),
                }),
            },
            Self::Cbor => serialize(value).map_err(|err| CodecError::Binary(err.to_string())),
        }
    }

    /// Decode column bytes back into a value of the declared kind.
    pub fn decode(self, kind: ValueKind, bytes: &[u8]) -> Result<Value, CodecError> {
        match self {
            Self::Text => {
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| CodecError::Binary("column is not valid utf-8".to_string()))?;
                decode_text(kind, text)
            }
            Self::Cbor => {
                let value: Value =
                    deserialize(bytes).map_err(|err| CodecError::Binary(err.to_string()))?;
                if value.kind() == kind {
                    Ok(value)
                } else {
                    Err(CodecError::KindMismatch {
                        expected: kind,
                        found: value.kind(),
                    })
                }
            }
        }
    }
}

fn decode_text(kind: ValueKind, text: &str) -> Result<Value, CodecError> {
    let unparsable = || CodecError::UnparsableText {
        kind,
        text: text.to_string(),
    };

    match kind {
        ValueKind::Text => Ok(Value::Text(text.to_string())),
        ValueKind::Bool => match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(unparsable()),
        },
        ValueKind::Int => text.parse().map(Value::Int).map_err(|_| unparsable()),
        ValueKind::Uint => text.parse().map(Value::Uint).map_err(|_| unparsable()),
        ValueKind::Float => text.parse().map(Value::Float).map_err(|_| unparsable()),
        ValueKind::Timestamp => text
            .strip_prefix('@')
            .unwrap_or(text)
            .parse()
            .map(Value::Timestamp)
            .map_err(|_| unparsable()),
        ValueKind::Bytes | ValueKind::Unit => Err(CodecError::UnsupportedTextKind { kind }),
    }
}

/// Encode one map entry as its canonical (key, value) pair.
///
/// Map entries always use the binary form; the property's scalar codec
/// applies to scalar columns only.
pub fn encode_map_entry(key: &Value, value: &Value) -> Result<Vec<u8>, CodecError> {
    serialize(&(key, value)).map_err(|err| CodecError::Binary(err.to_string()))
}

/// Decode one map entry produced by [`encode_map_entry`].
pub fn decode_map_entry(bytes: &[u8]) -> Result<(Value, Value), CodecError> {
    deserialize(bytes).map_err(|err| CodecError::Binary(err.to_string()))
}

///
/// TESTS
///
