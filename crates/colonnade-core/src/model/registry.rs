use crate::{
    error::InternalError,
    model::{entity::EntityMeta, property::MetaError},
};
use std::{collections::BTreeMap, sync::Arc};

///
/// SchemaRegistry
///
/// Startup-built index of entity metadata, keyed by entity name and by
/// storage name. Populated once from the declarative source, then shared
/// read-only; operations that name an unregistered mapping are caller
/// error, not store state.
///

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    by_name: BTreeMap<String, Arc<EntityMeta>>,
    by_storage: BTreeMap<String, String>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one entity; duplicate entity or storage names are fatal.
    pub fn register(&mut self, meta: EntityMeta) -> Result<Arc<EntityMeta>, MetaError> {
        if self.by_name.contains_key(meta.name()) {
            return Err(MetaError::DuplicateEntity {
                entity: meta.name().to_string(),
            });
        }
        if let Some(owner) = self.by_storage.get(meta.storage_name()) {
            return Err(MetaError::DuplicateStorage {
                storage: meta.storage_name().to_string(),
                entity: owner.clone(),
            });
        }

        let meta = Arc::new(meta);
        self.by_storage
            .insert(meta.storage_name().to_string(), meta.name().to_string());
        self.by_name.insert(meta.name().to_string(), Arc::clone(&meta));

        Ok(meta)
    }

    /// Look up entity metadata by entity name.
    pub fn get(&self, entity: &str) -> Result<&Arc<EntityMeta>, InternalError> {
        self.by_name
            .get(entity)
            .ok_or_else(|| InternalError::unknown_mapping(entity))
    }

    /// Look up entity metadata by storage (table) name.
    pub fn get_by_storage(&self, storage: &str) -> Result<&Arc<EntityMeta>, InternalError> {
        let entity = self
            .by_storage
            .get(storage)
            .ok_or_else(|| InternalError::unknown_mapping(storage))?;

        self.get(entity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

///
/// TESTS
///
