//! Composite column names: ordered, typed component sequences that identify
//! columns inside a row and, with non-equal component modes, describe the
//! half-open ranges used for bulk reads and range tombstones.
//!
//! The wire form is the store comparator: per component
//! `[kind tag][u16 BE payload len][payload][EOC]`, where the EOC byte is
//! 0x00 / 0x01 / 0xFF for Equal / GreaterThanEqual / LessThan. Persisted
//! composites are all-Equal; non-equal modes exist only in transient query
//! bounds, which is what makes `[start, end)` select exactly one property's
//! columns.

#[cfg(test)]
mod tests;

use crate::{
    MAX_COMPOSITE_COMPONENTS,
    error::InternalError,
    model::property::PropertyMeta,
    value::{Value, ValueDecodeError, ValueKind},
};
use std::fmt::{self, Display};
use thiserror::Error as ThisError;
use xxhash_rust::xxh3::xxh3_64;

/// Category discriminator for the schema-version marker column.
/// Sorts before every property flag (see `PropertyKind` discriminators).
pub(crate) const FLAG_VERSION: u8 = 0;

/// Column name of the schema-version marker.
pub(crate) const VERSION_COLUMN: &str = "_version";

///
/// CompositeError
///

#[derive(Debug, ThisError)]
pub enum CompositeError {
    #[error("composite exceeds {max} components")]
    TooManyComponents { max: usize },

    #[error("compound key arity mismatch on '{property}': expected {expected}, found {found}")]
    KeyArityMismatch {
        property: String,
        expected: usize,
        found: usize,
    },

    #[error("compound key component {index} on '{property}': expected {expected}, found {found}")]
    KeyKindMismatch {
        property: String,
        index: usize,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("corrupted composite: truncated encoding")]
    Truncated,

    #[error("corrupted composite: invalid component kind {kind}")]
    InvalidComponentKind { kind: u8 },

    #[error("corrupted composite: invalid equality byte {eoc:#04x}")]
    InvalidEquality { eoc: u8 },

    #[error("corrupted composite component: {0}")]
    Component(#[from] ValueDecodeError),
}

impl From<CompositeError> for InternalError {
    fn from(err: CompositeError) -> Self {
        match err {
            CompositeError::Truncated
            | CompositeError::InvalidComponentKind { .. }
            | CompositeError::InvalidEquality { .. }
            | CompositeError::Component(_) => Self::codec_corruption(err.to_string()),
            _ => Self::encoding(err.to_string()),
        }
    }
}

///
/// ComponentEquality
///
/// Range mode for one component. Only meaningful on transient query
/// bounds; persisted components are always `Equal`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComponentEquality {
    LessThan,
    Equal,
    GreaterThanEqual,
}

impl ComponentEquality {
    const fn eoc(self) -> u8 {
        match self {
            Self::Equal => 0x00,
            Self::GreaterThanEqual => 0x01,
            Self::LessThan => 0xFF,
        }
    }

    const fn try_from_eoc(eoc: u8) -> Result<Self, CompositeError> {
        match eoc {
            0x00 => Ok(Self::Equal),
            0x01 => Ok(Self::GreaterThanEqual),
            0xFF => Ok(Self::LessThan),
            _ => Err(CompositeError::InvalidEquality { eoc }),
        }
    }
}

///
/// ComponentValue
///
/// One typed slot in a composite name. The kind tag doubles as the
/// serializer/comparator marker in the wire form.
///

#[derive(Clone, Debug, PartialEq)]
pub enum ComponentValue {
    /// Category discriminator byte.
    Flag(u8),
    /// Property name, entity name.
    Text(String),
    /// Write-order position of a list element.
    Index(u64),
    /// Hash discriminant of a set element or map key.
    Hash(u64),
    /// Scalar component (compound wide-map keys, counter row keys).
    Value(Value),
}

impl ComponentValue {
    // ── Component kind tags (DO NOT reorder) ─────────────────────────
    const KIND_FLAG: u8 = 0;
    const KIND_TEXT: u8 = 1;
    const KIND_INDEX: u8 = 2;
    const KIND_HASH: u8 = 3;
    const KIND_VALUE: u8 = 4;

    const fn kind_tag(&self) -> u8 {
        match self {
            Self::Flag(_) => Self::KIND_FLAG,
            Self::Text(_) => Self::KIND_TEXT,
            Self::Index(_) => Self::KIND_INDEX,
            Self::Hash(_) => Self::KIND_HASH,
            Self::Value(_) => Self::KIND_VALUE,
        }
    }

    fn payload(&self) -> Vec<u8> {
        match self {
            Self::Flag(flag) => vec![*flag],
            Self::Text(text) => text.clone().into_bytes(),
            Self::Index(index) => index.to_be_bytes().to_vec(),
            Self::Hash(hash) => hash.to_be_bytes().to_vec(),
            Self::Value(value) => value.to_bytes(),
        }
    }

    fn try_from_wire(kind: u8, payload: &[u8]) -> Result<Self, CompositeError> {
        let word = |payload: &[u8]| -> Result<u64, CompositeError> {
            let bytes: [u8; 8] = payload.try_into().map_err(|_| CompositeError::Truncated)?;
            Ok(u64::from_be_bytes(bytes))
        };

        match kind {
            Self::KIND_FLAG => match payload {
                [flag] => Ok(Self::Flag(*flag)),
                _ => Err(CompositeError::Truncated),
            },
            Self::KIND_TEXT => String::from_utf8(payload.to_vec())
                .map(Self::Text)
                .map_err(|_| CompositeError::Component(ValueDecodeError::InvalidText)),
            Self::KIND_INDEX => Ok(Self::Index(word(payload)?)),
            Self::KIND_HASH => Ok(Self::Hash(word(payload)?)),
            Self::KIND_VALUE => Ok(Self::Value(Value::try_from_bytes(payload)?)),
            _ => Err(CompositeError::InvalidComponentKind { kind }),
        }
    }
}

///
/// Component
///

#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    pub value: ComponentValue,
    pub equality: ComponentEquality,
}

impl Component {
    #[must_use]
    pub const fn equal(value: ComponentValue) -> Self {
        Self {
            value,
            equality: ComponentEquality::Equal,
        }
    }
}

///
/// CompositeColumnName
///

#[derive(Clone, Debug, PartialEq)]
pub struct CompositeColumnName {
    components: Vec<Component>,
}

impl CompositeColumnName {
    fn new(components: Vec<Component>) -> Result<Self, CompositeError> {
        if components.len() > MAX_COMPOSITE_COMPONENTS {
            return Err(CompositeError::TooManyComponents {
                max: MAX_COMPOSITE_COMPONENTS,
            });
        }

        Ok(Self { components })
    }

    // Factory-internal constructor for composites with a statically bounded
    // component count.
    fn from_fixed(components: Vec<Component>) -> Self {
        debug_assert!(components.len() <= MAX_COMPOSITE_COMPONENTS);
        Self { components }
    }

    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// True when every component uses `Equal` mode (the persisted form).
    #[must_use]
    pub fn is_persistable(&self) -> bool {
        self.components
            .iter()
            .all(|c| c.equality == ComponentEquality::Equal)
    }

    /// Encode into the store comparator form.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for component in &self.components {
            let payload = component.value.payload();
            buf.push(component.value.kind_tag());
            // Component payloads are bounded well below u16::MAX; scalar
            // values are words and names are short identifiers.
            #[allow(clippy::cast_possible_truncation)]
            buf.extend_from_slice(&(payload.len() as u16).to_be_bytes());
            buf.extend_from_slice(&payload);
            buf.push(component.equality.eoc());
        }

        buf
    }

    /// Decode a comparator-form encoding back into components.
    ///
    /// This is a corruption boundary: range reads hand back raw column
    /// names which must decode cleanly or the row is unusable.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, CompositeError> {
        let mut components = Vec::new();
        let mut rest = bytes;

        while !rest.is_empty() {
            let [kind, len_hi, len_lo, tail @ ..] = rest else {
                return Err(CompositeError::Truncated);
            };
            let len = usize::from(u16::from_be_bytes([*len_hi, *len_lo]));
            if tail.len() < len + 1 {
                return Err(CompositeError::Truncated);
            }
            let (payload, after) = tail.split_at(len);
            let value = ComponentValue::try_from_wire(*kind, payload)?;
            let equality = ComponentEquality::try_from_eoc(after[0])?;

            components.push(Component { value, equality });
            rest = &after[1..];
        }

        Self::new(components)
    }
}

impl Display for CompositeColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.components {
            if !first {
                write!(f, ":")?;
            }
            first = false;
            match &component.value {
                ComponentValue::Flag(flag) => write!(f, "#{flag}")?,
                ComponentValue::Text(text) => write!(f, "{text}")?,
                ComponentValue::Index(index) => write!(f, "[{index}]")?,
                ComponentValue::Hash(hash) => write!(f, "h{hash:016x}")?,
                ComponentValue::Value(value) => write!(f, "{value}")?,
            }
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------
// Factory: deterministic (PropertyMeta, discriminant) → column name
// ----------------------------------------------------------------------

fn base_components(meta: &PropertyMeta) -> Vec<Component> {
    vec![
        Component::equal(ComponentValue::Flag(meta.kind().flag())),
        Component::equal(ComponentValue::Text(meta.name().to_string())),
    ]
}

/// Column name for a single-valued property (simple, join-simple, counter).
#[must_use]
pub fn single_column(meta: &PropertyMeta) -> CompositeColumnName {
    CompositeColumnName::from_fixed(base_components(meta))
}

/// Column name for one list element; the index is the write-order position,
/// which guarantees stable ordering on read-back.
#[must_use]
pub fn list_column(meta: &PropertyMeta, index: u64) -> CompositeColumnName {
    let mut components = base_components(meta);
    components.push(Component::equal(ComponentValue::Index(index)));
    CompositeColumnName::from_fixed(components)
}

/// Column name for a set element or map entry, addressed by the hash of the
/// element/key's canonical bytes.
///
/// Hash collisions between distinct discriminants are an accepted
/// limitation of this addressing scheme: the colliding columns share a name
/// and the last write wins.
#[must_use]
pub fn hashed_column(meta: &PropertyMeta, discriminant: &Value) -> CompositeColumnName {
    let mut components = base_components(meta);
    components.push(Component::equal(ComponentValue::Hash(hash_discriminant(
        discriminant,
    ))));
    CompositeColumnName::from_fixed(components)
}

/// Hash discriminant for set/map column addressing.
#[must_use]
pub fn hash_discriminant(value: &Value) -> u64 {
    xxh3_64(&value.to_bytes())
}

/// Column name for one wide-map column, validated against the property's
/// declared compound-key shape.
pub fn wide_map_column(
    meta: &PropertyMeta,
    key: &[Value],
) -> Result<CompositeColumnName, CompositeError> {
    let expected: Vec<ValueKind> = meta.multi_key().map_or_else(
        || meta.key_kind().into_iter().collect(),
        |multi| multi.components.clone(),
    );

    if key.len() != expected.len() {
        return Err(CompositeError::KeyArityMismatch {
            property: meta.name().to_string(),
            expected: expected.len(),
            found: key.len(),
        });
    }
    for (index, (value, kind)) in key.iter().zip(&expected).enumerate() {
        if value.kind() != *kind {
            return Err(CompositeError::KeyKindMismatch {
                property: meta.name().to_string(),
                index,
                expected: *kind,
                found: value.kind(),
            });
        }
    }

    let mut components = base_components(meta);
    components.extend(key.iter().cloned().map(|v| Component::equal(ComponentValue::Value(v))));
    CompositeColumnName::new(components)
}

/// Half-open range `[start, end)` selecting exactly this property's columns.
///
/// The start bound keeps `Equal` through the property-name component; the
/// end bound switches that component to `GreaterThanEqual`, so every
/// persisted composite carrying further components sorts inside the range
/// and every other property sorts outside it.
#[must_use]
pub fn property_range(meta: &PropertyMeta) -> (CompositeColumnName, CompositeColumnName) {
    let start = CompositeColumnName::from_fixed(base_components(meta));

    let mut end_components = base_components(meta);
    if let Some(last) = end_components.last_mut() {
        last.equality = ComponentEquality::GreaterThanEqual;
    }
    let end = CompositeColumnName::from_fixed(end_components);

    (start, end)
}

/// Column name of the schema-version marker written for entities that
/// declare a version.
#[must_use]
pub fn version_column() -> CompositeColumnName {
    CompositeColumnName::from_fixed(vec![
        Component::equal(ComponentValue::Flag(FLAG_VERSION)),
        Component::equal(ComponentValue::Text(VERSION_COLUMN.to_string())),
    ])
}

/// Row key in the counter row-space for one counter property.
///
/// Counters live in a separate logical row-space keyed by
/// `(entity, primary key, property)`: neither encoding is compatible with
/// the other's comparator, so counter and regular composites never share a
/// row. Folding the property name into the row key makes per-property
/// counter-row tombstones exact.
#[must_use]
pub fn counter_row_key(entity: &str, primary_key: &Value, property: &str) -> CompositeColumnName {
    CompositeColumnName::from_fixed(vec![
        Component::equal(ComponentValue::Text(entity.to_string())),
        Component::equal(ComponentValue::Value(primary_key.clone())),
        Component::equal(ComponentValue::Text(property.to_string())),
    ])
}
