use colonnade_core::{
    db::{
        ConsistencyLevel, FlushContext, FlushState, Loader, Persister, Record, Remover,
        composite,
        store::ColumnStore,
    },
    error::InternalError,
    model::{
        entity::EntityMeta,
        property::MetaError,
        registry::SchemaRegistry,
    },
    value::Value,
};
use std::sync::Arc;

///
/// Session
///
/// The operational surface: owns the store, the schema registry and the
/// current flush context. One session per logical call chain; a session is
/// `Send` when its store is, but never shared between concurrent
/// operations.
///

pub struct Session<S> {
    store: S,
    registry: SchemaRegistry,
    ctx: FlushContext,
}

impl<S: ColumnStore> Session<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            registry: SchemaRegistry::new(),
            ctx: FlushContext::new(),
        }
    }

    /// Register one entity's metadata. Startup-time; duplicates are fatal.
    pub fn register(&mut self, meta: EntityMeta) -> Result<Arc<EntityMeta>, MetaError> {
        self.registry.register(meta)
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn state(&self) -> FlushState {
        self.ctx.state()
    }

    /// Persist every loaded property of a record.
    pub fn persist(&mut self, record: &Record) -> Result<(), InternalError> {
        let meta = self.registry.get(record.entity())?.clone();
        Persister::new(&self.registry).persist(&mut self.store, &mut self.ctx, &meta, record)
    }

    /// Persist one named property of a record.
    pub fn persist_property(&mut self, record: &Record, name: &str) -> Result<(), InternalError> {
        let meta = self.registry.get(record.entity())?.clone();
        Persister::new(&self.registry).persist_property(
            &mut self.store,
            &mut self.ctx,
            &meta,
            record,
            name,
        )
    }

    /// Remove a record's row, plus every tombstone its metadata requires.
    pub fn remove(&mut self, record: &Record) -> Result<(), InternalError> {
        self.remove_by_key(record.entity(), record.key().clone())
    }

    /// Remove an entity row by primary key.
    pub fn remove_by_key(&mut self, entity: &str, key: Value) -> Result<(), InternalError> {
        let meta = self.registry.get(entity)?.clone();
        Remover::new().remove(&mut self.store, &mut self.ctx, &meta, &key)
    }

    /// Remove a row addressed by its storage (table) name; a table with no
    /// prepared mapping is caller error.
    pub fn remove_by_table(&mut self, table: &str, key: Value) -> Result<(), InternalError> {
        let meta = self.registry.get_by_storage(table)?.clone();
        Remover::new().remove(&mut self.store, &mut self.ctx, &meta, &key)
    }

    /// Remove one named property of a row.
    pub fn remove_property(
        &mut self,
        entity: &str,
        key: Value,
        name: &str,
    ) -> Result<(), InternalError> {
        let meta = self.registry.get(entity)?.clone();
        Remover::new().remove_property(&mut self.store, &mut self.ctx, &meta, &key, name)
    }

    /// Read one property back and install it on the record; `false` means
    /// the store held nothing for it.
    pub fn load_property(&mut self, record: &mut Record, name: &str) -> Result<bool, InternalError> {
        let meta = self.registry.get(record.entity())?.clone();
        Loader::new().load_property(&self.store, &self.ctx, &meta, record, name)
    }

    /// Read the current value of a counter property.
    pub fn read_counter(
        &self,
        entity: &str,
        key: &Value,
        property: &str,
    ) -> Result<Option<i64>, InternalError> {
        let meta = self.registry.get(entity)?.clone();
        let prop = meta
            .property(property)
            .ok_or_else(|| InternalError::unmapped_property(entity, property))?;

        let level = colonnade_core::db::consistency::resolve(
            self.ctx.read_level(),
            prop.read_override(),
            meta.read_default(),
        );
        let row = composite::counter_row_key(meta.name(), key, prop.name()).encode();
        let column = composite::single_column(prop).encode();

        Ok(self.store.read_counter(&row, &column, level)?)
    }

    // ── Flush lifecycle ──────────────────────────────────────────────

    pub fn start_batch(&mut self) -> Result<(), InternalError> {
        self.ctx.start_batch()
    }

    pub fn flush(&mut self) -> Result<(), InternalError> {
        self.ctx.flush(&mut self.store)
    }

    pub fn end_batch(&mut self) -> Result<(), InternalError> {
        self.ctx.end_batch()
    }

    /// Discard unflushed work and overrides, then start a fresh context;
    /// the cleaned context itself is never reused.
    pub fn clean_up(&mut self) {
        self.ctx.clean_up();
        self.ctx = FlushContext::new();
    }

    pub const fn set_read_consistency_level(&mut self, level: Option<ConsistencyLevel>) {
        self.ctx.set_read_level(level);
    }

    pub const fn set_write_consistency_level(&mut self, level: Option<ConsistencyLevel>) {
        self.ctx.set_write_level(level);
    }
}

///
/// TESTS
///
