use crate::{
    MAX_COMPOSITE_COMPONENTS,
    db::{codec::ColumnCodec, consistency::ConsistencyLevel},
    error::InternalError,
    value::ValueKind,
};
use thiserror::Error as ThisError;

///
/// MetaError
/// (startup boundary — every variant is a fatal configuration error)
///

#[derive(Debug, ThisError)]
pub enum MetaError {
    #[error("property name must not be empty")]
    EmptyPropertyName,

    #[error("owning entity name must not be empty for property '{property}'")]
    EmptyEntityName { property: String },

    #[error("map property '{property}' requires a key kind")]
    MissingKeyKind { property: String },

    #[error("property '{property}' declares a key kind but is not a map")]
    UnexpectedKeyKind { property: String },

    #[error("compound keys are only supported on wide-map properties ('{property}')")]
    MultiKeyOnNarrowProperty { property: String },

    #[error("compound key on '{property}' has {arity} components (1..={max} allowed)")]
    MultiKeyArity {
        property: String,
        arity: usize,
        max: usize,
    },

    #[error("counter property '{property}' must declare an int value kind, found {found}")]
    CounterValueKind { property: String, found: ValueKind },

    #[error("entity '{entity}' has no primary key metadata")]
    MissingIdMeta { entity: String },

    #[error("entity '{entity}' declares duplicate property '{property}'")]
    DuplicateProperty { entity: String, property: String },

    #[error("wide-row entity '{entity}' must map exactly one wide-map property")]
    InvalidWideRow { entity: String },

    #[error("entity '{entity}' is already registered")]
    DuplicateEntity { entity: String },

    #[error("storage name '{storage}' is already mapped by entity '{entity}'")]
    DuplicateStorage { storage: String, entity: String },
}

impl From<MetaError> for InternalError {
    fn from(err: MetaError) -> Self {
        Self::configuration(err.to_string())
    }
}

///
/// CascadeType
///
/// What persisting an owning entity does to a joined one: persist it too,
/// or only verify that it already exists.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CascadeType {
    Persist,
    EnsureExists,
}

///
/// JoinMeta
///
/// Target of a join property. The target is named, not referenced; the
/// registry resolves it at operation time so mutually-referencing entities
/// can both be registered.
///

#[derive(Clone, Debug)]
pub struct JoinMeta {
    pub target_entity: String,
    pub cascade: CascadeType,
}

impl JoinMeta {
    #[must_use]
    pub fn new(target_entity: impl Into<String>, cascade: CascadeType) -> Self {
        Self {
            target_entity: target_entity.into(),
            cascade,
        }
    }
}

///
/// MultiKeyMeta
///
/// Ordered component kinds for a compound wide-map column key.
///

#[derive(Clone, Debug)]
pub struct MultiKeyMeta {
    pub components: Vec<ValueKind>,
}

impl MultiKeyMeta {
    #[must_use]
    pub const fn new(components: Vec<ValueKind>) -> Self {
        Self { components }
    }

    #[must_use]
    pub const fn arity(&self) -> usize {
        self.components.len()
    }
}

///
/// PropertyKind
///
/// Storage category as tagged-variant dispatch: each category carries
/// exactly its required payload, checked once at metadata construction.
///

#[derive(Clone, Debug)]
pub enum PropertyKind {
    Simple,
    List,
    Set,
    Map,
    Counter,
    WideMap,
    JoinSimple(JoinMeta),
    JoinWideMap(JoinMeta),
    CounterWideMap,
}

impl PropertyKind {
    // ── Category discriminators (DO NOT reorder) ─────────────────────
    // Spaced by ten so future categories can slot between existing ones
    // without re-encoding persisted composites.
    pub(crate) const FLAG_SIMPLE: u8 = 10;
    pub(crate) const FLAG_LIST: u8 = 20;
    pub(crate) const FLAG_SET: u8 = 30;
    pub(crate) const FLAG_MAP: u8 = 40;
    pub(crate) const FLAG_COUNTER: u8 = 50;
    pub(crate) const FLAG_WIDE_MAP: u8 = 60;
    pub(crate) const FLAG_JOIN_SIMPLE: u8 = 70;
    pub(crate) const FLAG_JOIN_WIDE_MAP: u8 = 80;
    pub(crate) const FLAG_COUNTER_WIDE_MAP: u8 = 90;

    #[must_use]
    pub const fn flag(&self) -> u8 {
        match self {
            Self::Simple => Self::FLAG_SIMPLE,
            Self::List => Self::FLAG_LIST,
            Self::Set => Self::FLAG_SET,
            Self::Map => Self::FLAG_MAP,
            Self::Counter => Self::FLAG_COUNTER,
            Self::WideMap => Self::FLAG_WIDE_MAP,
            Self::JoinSimple(_) => Self::FLAG_JOIN_SIMPLE,
            Self::JoinWideMap(_) => Self::FLAG_JOIN_WIDE_MAP,
            Self::CounterWideMap => Self::FLAG_COUNTER_WIDE_MAP,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
            Self::Counter => "counter",
            Self::WideMap => "wide_map",
            Self::JoinSimple(_) => "join_simple",
            Self::JoinWideMap(_) => "join_wide_map",
            Self::CounterWideMap => "counter_wide_map",
        }
    }
}

///
/// PropertyMeta
///
/// Runtime metadata for one mapped property. Built once at startup,
/// immutable thereafter, shared read-only across operations.
///

#[derive(Clone, Debug)]
pub struct PropertyMeta {
    name: String,
    entity: String,
    kind: PropertyKind,
    codec: ColumnCodec,
    key_kind: Option<ValueKind>,
    value_kind: ValueKind,
    consistency: Option<(ConsistencyLevel, ConsistencyLevel)>,
    multi_key: Option<MultiKeyMeta>,
}

impl PropertyMeta {
    #[must_use]
    pub fn builder() -> PropertyMetaBuilder {
        PropertyMetaBuilder::default()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    #[must_use]
    pub const fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    #[must_use]
    pub const fn codec(&self) -> ColumnCodec {
        self.codec
    }

    #[must_use]
    pub const fn key_kind(&self) -> Option<ValueKind> {
        self.key_kind
    }

    #[must_use]
    pub const fn value_kind(&self) -> ValueKind {
        self.value_kind
    }

    #[must_use]
    pub const fn multi_key(&self) -> Option<&MultiKeyMeta> {
        self.multi_key.as_ref()
    }

    #[must_use]
    pub const fn join(&self) -> Option<&JoinMeta> {
        match &self.kind {
            PropertyKind::JoinSimple(join) | PropertyKind::JoinWideMap(join) => Some(join),
            _ => None,
        }
    }

    /// Per-property read consistency override, if declared.
    #[must_use]
    pub const fn read_override(&self) -> Option<ConsistencyLevel> {
        match self.consistency {
            Some((read, _)) => Some(read),
            None => None,
        }
    }

    /// Per-property write consistency override, if declared.
    #[must_use]
    pub const fn write_override(&self) -> Option<ConsistencyLevel> {
        match self.consistency {
            Some((_, write)) => Some(write),
            None => None,
        }
    }

    #[must_use]
    pub const fn is_counter(&self) -> bool {
        matches!(
            self.kind,
            PropertyKind::Counter | PropertyKind::CounterWideMap
        )
    }

    #[must_use]
    pub const fn is_wide_map(&self) -> bool {
        matches!(
            self.kind,
            PropertyKind::WideMap | PropertyKind::JoinWideMap(_) | PropertyKind::CounterWideMap
        )
    }
}

///
/// PropertyMetaBuilder
///
/// Side-effect-free builder; `build` either yields complete metadata or a
/// fatal [`MetaError`]. Never partially constructs.
///

#[derive(Debug, Default)]
pub struct PropertyMetaBuilder {
    name: Option<String>,
    entity: Option<String>,
    kind: Option<PropertyKind>,
    codec: Option<ColumnCodec>,
    key_kind: Option<ValueKind>,
    value_kind: Option<ValueKind>,
    consistency: Option<(ConsistencyLevel, ConsistencyLevel)>,
    multi_key: Option<MultiKeyMeta>,
}

impl PropertyMetaBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: PropertyKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub const fn codec(mut self, codec: ColumnCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    #[must_use]
    pub const fn key_kind(mut self, kind: ValueKind) -> Self {
        self.key_kind = Some(kind);
        self
    }

    #[must_use]
    pub const fn value_kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = Some(kind);
        self
    }

    #[must_use]
    pub const fn consistency(mut self, read: ConsistencyLevel, write: ConsistencyLevel) -> Self {
        self.consistency = Some((read, write));
        self
    }

    #[must_use]
    pub fn multi_key(mut self, multi_key: MultiKeyMeta) -> Self {
        self.multi_key = Some(multi_key);
        self
    }

    pub fn build(self) -> Result<PropertyMeta, MetaError> {
        let name = self.name.filter(|n| !n.is_empty()).ok_or(MetaError::EmptyPropertyName)?;
        let entity = self
            .entity
            .filter(|e| !e.is_empty())
            .ok_or_else(|| MetaError::EmptyEntityName {
                property: name.clone(),
            })?;

        let kind = self.kind.unwrap_or(PropertyKind::Simple);
        let codec = self.codec.unwrap_or(ColumnCodec::Cbor);
        let value_kind = self.value_kind.unwrap_or(ValueKind::Text);

        // Map and wide-map kinds address columns by key; everything else
        // must not declare one.
        let keyed = matches!(
            kind,
            PropertyKind::Map
                | PropertyKind::WideMap
                | PropertyKind::JoinWideMap(_)
                | PropertyKind::CounterWideMap
        );
        match (keyed, self.key_kind) {
            (true, None) if matches!(kind, PropertyKind::Map) => {
                return Err(MetaError::MissingKeyKind { property: name });
            }
            (false, Some(_)) => {
                return Err(MetaError::UnexpectedKeyKind { property: name });
            }
            _ => {}
        }

        if let Some(multi_key) = &self.multi_key {
            let wide = matches!(
                kind,
                PropertyKind::WideMap
                    | PropertyKind::JoinWideMap(_)
                    | PropertyKind::CounterWideMap
            );
            if !wide {
                return Err(MetaError::MultiKeyOnNarrowProperty { property: name });
            }

            // Two slots are reserved for the category flag and property name.
            let max = MAX_COMPOSITE_COMPONENTS - 2;
            if multi_key.arity() == 0 || multi_key.arity() > max {
                return Err(MetaError::MultiKeyArity {
                    property: name,
                    arity: multi_key.arity(),
                    max,
                });
            }
        }

        if matches!(kind, PropertyKind::Counter | PropertyKind::CounterWideMap)
            && value_kind != ValueKind::Int
        {
            return Err(MetaError::CounterValueKind {
                property: name,
                found: value_kind,
            });
        }

        Ok(PropertyMeta {
            name,
            entity,
            kind,
            codec,
            key_kind: self.key_kind,
            value_kind,
            consistency: self.consistency,
            multi_key: self.multi_key,
        })
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PropertyMetaBuilder {
        PropertyMeta::builder().name("p").entity("e")
    }

    #[test]
    fn simple_property_defaults() {
        let meta = base().build().unwrap();
        assert!(matches!(meta.kind(), PropertyKind::Simple));
        assert_eq!(meta.codec(), ColumnCodec::Cbor);
        assert!(!meta.is_counter());
        assert!(!meta.is_wide_map());
        assert!(meta.read_override().is_none());
    }

    #[test]
    fn map_requires_key_kind() {
        let err = base().kind(PropertyKind::Map).build().unwrap_err();
        assert!(matches!(err, MetaError::MissingKeyKind { .. }));
    }

    #[test]
    fn key_kind_outside_map_is_rejected() {
        let err = base().key_kind(ValueKind::Text).build().unwrap_err();
        assert!(matches!(err, MetaError::UnexpectedKeyKind { .. }));
    }

    #[test]
    fn multi_key_is_wide_map_only() {
        let err = base()
            .kind(PropertyKind::List)
            .multi_key(MultiKeyMeta::new(vec![ValueKind::Uint]))
            .build()
            .unwrap_err();
        assert!(matches!(err, MetaError::MultiKeyOnNarrowProperty { .. }));
    }

    #[test]
    fn multi_key_arity_is_bounded() {
        let err = base()
            .kind(PropertyKind::WideMap)
            .multi_key(MultiKeyMeta::new(vec![ValueKind::Uint; 16]))
            .build()
            .unwrap_err();
        assert!(matches!(err, MetaError::MultiKeyArity { .. }));
    }

    #[test]
    fn counter_requires_int_value_kind() {
        let err = base().kind(PropertyKind::Counter).build().unwrap_err();
        assert!(matches!(err, MetaError::CounterValueKind { .. }));

        let meta = base()
            .kind(PropertyKind::Counter)
            .value_kind(ValueKind::Int)
            .build()
            .unwrap();
        assert!(meta.is_counter());
        assert!(!meta.is_wide_map());
    }

    #[test]
    fn counter_wide_map_is_both_counter_and_wide() {
        let meta = base()
            .kind(PropertyKind::CounterWideMap)
            .value_kind(ValueKind::Int)
            .build()
            .unwrap();
        assert!(meta.is_counter());
        assert!(meta.is_wide_map());
    }

    #[test]
    fn category_flags_are_distinct() {
        let flags = [
            PropertyKind::FLAG_SIMPLE,
            PropertyKind::FLAG_LIST,
            PropertyKind::FLAG_SET,
            PropertyKind::FLAG_MAP,
            PropertyKind::FLAG_COUNTER,
            PropertyKind::FLAG_WIDE_MAP,
            PropertyKind::FLAG_JOIN_SIMPLE,
            PropertyKind::FLAG_JOIN_WIDE_MAP,
            PropertyKind::FLAG_COUNTER_WIDE_MAP,
        ];
        let unique: std::collections::BTreeSet<_> = flags.iter().collect();
        assert_eq!(unique.len(), flags.len());
    }
}
