use crate::value::Value;
use std::collections::BTreeMap;

///
/// PropertyValue
///
/// The loaded shape of one property. Collections are snapshots; `Join`
/// carries an already-resolved one-hop target record.
///

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Simple(Value),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Counter(i64),
    Join(Record),
}

///
/// PropertyState
///
/// Explicit load state. `NotLoaded` means "never set or never fetched";
/// persisting it writes nothing, it is not a tombstone.
///

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyState {
    NotLoaded,
    Loaded(PropertyValue),
}

impl PropertyState {
    #[must_use]
    pub const fn loaded(&self) -> Option<&PropertyValue> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::NotLoaded => None,
        }
    }
}

///
/// Record
///
/// An entity snapshot: the primary-key value plus per-property load
/// state. Pure data; all persistence behavior lives in the executors.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    entity: String,
    key: Value,
    properties: BTreeMap<String, PropertyState>,
}

impl Record {
    #[must_use]
    pub fn new(entity: impl Into<String>, key: Value) -> Self {
        Self {
            entity: entity.into(),
            key,
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    #[must_use]
    pub const fn key(&self) -> &Value {
        &self.key
    }

    /// Chainable setter used when assembling a record by hand.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.properties
            .insert(name.into(), PropertyState::Loaded(value));
    }

    /// Install a freshly-loaded value, replacing any prior state.
    pub fn install(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.set(name, value);
    }

    /// Load state for one property; absent entries read as `NotLoaded`.
    #[must_use]
    pub fn state(&self, name: &str) -> &PropertyState {
        self.properties.get(name).unwrap_or(&PropertyState::NotLoaded)
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&PropertyValue> {
        self.state(name).loaded()
    }
}

///
/// TESTS
///
