use crate::{
    db::consistency::ConsistencyLevel,
    model::property::{MetaError, PropertyMeta},
};

///
/// EntityMeta
///
/// Runtime model for one mapped record type: the primary-key property, the
/// ordered property list (authoritative for deterministic column layout),
/// entity-level consistency defaults and the target row container.
///

#[derive(Clone, Debug)]
pub struct EntityMeta {
    name: String,
    storage_name: String,
    id: PropertyMeta,
    properties: Vec<PropertyMeta>,
    consistency: (ConsistencyLevel, ConsistencyLevel),
    is_wide_row: bool,
    version: Option<u64>,
}

impl EntityMeta {
    #[must_use]
    pub fn builder() -> EntityMetaBuilder {
        EntityMetaBuilder::default()
    }

    /// Stable entity name used in counter row keys and registry routing.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target row-container identifier (table / column family).
    #[must_use]
    pub fn storage_name(&self) -> &str {
        &self.storage_name
    }

    #[must_use]
    pub const fn id(&self) -> &PropertyMeta {
        &self.id
    }

    /// Ordered property list; iteration order is the column layout.
    #[must_use]
    pub fn properties(&self) -> &[PropertyMeta] {
        &self.properties
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyMeta> {
        self.properties.iter().find(|meta| meta.name() == name)
    }

    #[must_use]
    pub const fn read_default(&self) -> ConsistencyLevel {
        self.consistency.0
    }

    #[must_use]
    pub const fn write_default(&self) -> ConsistencyLevel {
        self.consistency.1
    }

    #[must_use]
    pub const fn is_wide_row(&self) -> bool {
        self.is_wide_row
    }

    /// Declared schema version, if any. When present it is persisted as a
    /// marker column on every row the entity writes.
    #[must_use]
    pub const fn version(&self) -> Option<u64> {
        self.version
    }
}

///
/// EntityMetaBuilder
///

#[derive(Debug)]
pub struct EntityMetaBuilder {
    name: Option<String>,
    storage_name: Option<String>,
    id: Option<PropertyMeta>,
    properties: Vec<PropertyMeta>,
    consistency: (ConsistencyLevel, ConsistencyLevel),
    is_wide_row: bool,
    version: Option<u64>,
}

impl Default for EntityMetaBuilder {
    fn default() -> Self {
        Self {
            name: None,
            storage_name: None,
            id: None,
            properties: Vec::new(),
            consistency: (ConsistencyLevel::One, ConsistencyLevel::One),
            is_wide_row: false,
            version: None,
        }
    }
}

impl EntityMetaBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn storage_name(mut self, storage_name: impl Into<String>) -> Self {
        self.storage_name = Some(storage_name.into());
        self
    }

    #[must_use]
    pub fn id(mut self, id: PropertyMeta) -> Self {
        self.id = Some(id);
        self
    }

    /// Append a property; insertion order is preserved in the built meta.
    #[must_use]
    pub fn property(mut self, meta: PropertyMeta) -> Self {
        self.properties.push(meta);
        self
    }

    #[must_use]
    pub const fn consistency(mut self, read: ConsistencyLevel, write: ConsistencyLevel) -> Self {
        self.consistency = (read, write);
        self
    }

    #[must_use]
    pub const fn wide_row(mut self) -> Self {
        self.is_wide_row = true;
        self
    }

    /// Declare a schema version; rows persisted for this entity then carry
    /// a version marker column.
    #[must_use]
    pub const fn version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn build(self) -> Result<EntityMeta, MetaError> {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .ok_or(MetaError::EmptyPropertyName)?;
        let storage_name = self.storage_name.unwrap_or_else(|| name.clone());

        let id = self.id.ok_or_else(|| MetaError::MissingIdMeta {
            entity: name.clone(),
        })?;

        let mut seen = std::collections::BTreeSet::new();
        for meta in &self.properties {
            if !seen.insert(meta.name().to_string()) {
                return Err(MetaError::DuplicateProperty {
                    entity: name,
                    property: meta.name().to_string(),
                });
            }
        }

        // A wide-row entity *is* one wide-row abstraction: a single wide-map
        // property, no id+properties column split.
        if self.is_wide_row
            && (self.properties.len() != 1 || !self.properties[0].is_wide_map())
        {
            return Err(MetaError::InvalidWideRow { entity: name });
        }

        Ok(EntityMeta {
            name,
            storage_name,
            id,
            properties: self.properties,
            consistency: self.consistency,
            is_wide_row: self.is_wide_row,
            version: self.version,
        })
    }
}

///
/// TESTS
///
