//! Persist path: walks entity metadata in declaration order and turns the
//! loaded slice of a record into fully-resolved mutations.
//!
//! Absent properties persist nothing. Encoding failures abort before any
//! mutation reaches the flush context.

use crate::{
    db::{
        codec::encode_map_entry,
        composite,
        consistency::{self, ConsistencyLevel},
        flush::FlushContext,
        mutation::{Mutation, MutationOp, RowKey, TableName},
        record::{PropertyValue, Record},
        store::ColumnStore,
    },
    error::InternalError,
    model::{
        entity::EntityMeta,
        property::{CascadeType, PropertyKind, PropertyMeta},
        registry::SchemaRegistry,
    },
    obs::sink::{self, MetricsEvent, OpKind},
    serialize::serialize,
    value::Value,
};

///
/// Persister
///
/// Stateless walk over entity metadata; the registry is only consulted to
/// resolve join targets by name.
///

pub struct Persister<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> Persister<'a> {
    #[must_use]
    pub const fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Persist the loaded properties of a record, plus the schema-version
    /// marker column when the entity declares a version.
    pub fn persist<S: ColumnStore>(
        &self,
        store: &mut S,
        ctx: &mut FlushContext,
        meta: &EntityMeta,
        record: &Record,
    ) -> Result<(), InternalError> {
        check_record(meta, record)?;
        sink::record(MetricsEvent::OpStart {
            kind: OpKind::Persist,
            entity: meta.name().to_string(),
        });

        self.persist_record(store, ctx, meta, record, true)
    }

    /// Persist one named property of a record.
    pub fn persist_property<S: ColumnStore>(
        &self,
        store: &mut S,
        ctx: &mut FlushContext,
        meta: &EntityMeta,
        record: &Record,
        name: &str,
    ) -> Result<(), InternalError> {
        check_record(meta, record)?;
        let prop = mapped_property(meta, name)?;
        if prop.is_wide_map() {
            return Err(InternalError::persist_misuse(format!(
                "wide-map property '{name}' is not persisted through the row path"
            )));
        }

        sink::record(MetricsEvent::OpStart {
            kind: OpKind::Persist,
            entity: meta.name().to_string(),
        });

        self.persist_one(store, ctx, meta, record, prop, true)
    }

    fn persist_record<S: ColumnStore>(
        &self,
        store: &mut S,
        ctx: &mut FlushContext,
        meta: &EntityMeta,
        record: &Record,
        cascade: bool,
    ) -> Result<(), InternalError> {
        if let Some(version) = meta.version() {
            let level = consistency::resolve(ctx.write_level(), None, meta.write_default());
            let marker = Mutation::new(
                TableName::new(meta.storage_name()),
                RowKey::new(record.key().to_bytes()),
                MutationOp::InsertColumn {
                    column: composite::version_column().encode(),
                    value: serialize(&version)?,
                },
                level,
            );
            ctx.push(store, marker)?;
        }

        for prop in meta.properties() {
            if prop.is_wide_map() {
                continue;
            }
            self.persist_one(store, ctx, meta, record, prop, cascade)?;
        }

        Ok(())
    }

    fn persist_one<S: ColumnStore>(
        &self,
        store: &mut S,
        ctx: &mut FlushContext,
        meta: &EntityMeta,
        record: &Record,
        prop: &PropertyMeta,
        cascade: bool,
    ) -> Result<(), InternalError> {
        // Never-set is not a tombstone; nothing is written.
        let Some(value) = record.value(prop.name()) else {
            return Ok(());
        };

        let level = write_level(ctx, prop, meta);
        let table = TableName::new(meta.storage_name());
        let row = RowKey::new(record.key().to_bytes());

        match (prop.kind(), value) {
            (PropertyKind::Simple, PropertyValue::Simple(scalar)) => {
                let mutation = Mutation::new(
                    table,
                    row,
                    MutationOp::InsertColumn {
                        column: composite::single_column(prop).encode(),
                        value: prop.codec().encode(scalar)?,
                    },
                    level,
                );
                ctx.push(store, mutation)?;
            }

            (PropertyKind::List, PropertyValue::List(elements)) => {
                for (index, element) in elements.iter().enumerate() {
                    let mutation = Mutation::new(
                        table.clone(),
                        row.clone(),
                        MutationOp::InsertColumn {
                            column: composite::list_column(prop, index as u64).encode(),
                            value: prop.codec().encode(element)?,
                        },
                        level,
                    );
                    ctx.push(store, mutation)?;
                }
            }

            (PropertyKind::Set, PropertyValue::Set(elements)) => {
                for element in elements {
                    let mutation = Mutation::new(
                        table.clone(),
                        row.clone(),
                        MutationOp::InsertColumn {
                            column: composite::hashed_column(prop, element).encode(),
                            value: prop.codec().encode(element)?,
                        },
                        level,
                    );
                    ctx.push(store, mutation)?;
                }
            }

            (PropertyKind::Map, PropertyValue::Map(entries)) => {
                for (key, entry_value) in entries {
                    let mutation = Mutation::new(
                        table.clone(),
                        row.clone(),
                        MutationOp::InsertColumn {
                            column: composite::hashed_column(prop, key).encode(),
                            value: encode_map_entry(key, entry_value)?,
                        },
                        level,
                    );
                    ctx.push(store, mutation)?;
                }
            }

            (PropertyKind::Counter, PropertyValue::Counter(delta)) => {
                let mutation = counter_mutation(meta, record.key(), prop, *delta, level);
                ctx.push(store, mutation)?;
            }

            (PropertyKind::JoinSimple(join), PropertyValue::Join(target)) => {
                let mutation = Mutation::new(
                    table,
                    row,
                    MutationOp::InsertColumn {
                        column: composite::single_column(prop).encode(),
                        value: prop.codec().encode(target.key())?,
                    },
                    level,
                );
                ctx.push(store, mutation)?;

                if cascade {
                    self.cascade(store, ctx, join.cascade, &join.target_entity, target)?;
                }
            }

            (kind, value) => {
                return Err(InternalError::persist_misuse(format!(
                    "property '{}' holds a payload incompatible with its {} kind: {}",
                    prop.name(),
                    kind.label(),
                    value_label(value),
                )));
            }
        }

        Ok(())
    }

    /// One cascade hop. The joined record's own join properties write
    /// their foreign-key columns only; deeper cascades never happen, so
    /// mutually-referencing entities terminate.
    fn cascade<S: ColumnStore>(
        &self,
        store: &mut S,
        ctx: &mut FlushContext,
        cascade: CascadeType,
        target_entity: &str,
        target: &Record,
    ) -> Result<(), InternalError> {
        let target_meta = self.registry.get(target_entity)?.clone();
        check_record(&target_meta, target)?;
        sink::record(MetricsEvent::CascadeHop);

        match cascade {
            CascadeType::Persist => {
                self.persist_record(store, ctx, &target_meta, target, false)
            }
            CascadeType::EnsureExists => {
                let level =
                    consistency::resolve(ctx.read_level(), None, target_meta.read_default());
                let row = store.read_row(
                    target_meta.storage_name(),
                    &target.key().to_bytes(),
                    level,
                )?;
                if row.is_empty() {
                    return Err(InternalError::join_target_missing(
                        target_meta.name(),
                        target.key().to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

fn write_level(ctx: &FlushContext, prop: &PropertyMeta, meta: &EntityMeta) -> ConsistencyLevel {
    consistency::resolve(ctx.write_level(), prop.write_override(), meta.write_default())
}

pub(crate) fn check_record(meta: &EntityMeta, record: &Record) -> Result<(), InternalError> {
    if record.entity() != meta.name() {
        return Err(InternalError::persist_misuse(format!(
            "record for entity '{}' handed to '{}' metadata",
            record.entity(),
            meta.name(),
        )));
    }
    if record.key().kind() != meta.id().value_kind() {
        return Err(InternalError::persist_misuse(format!(
            "primary key kind {} does not match declared {}",
            record.key().kind(),
            meta.id().value_kind(),
        )));
    }
    Ok(())
}

pub(crate) fn mapped_property<'m>(
    meta: &'m EntityMeta,
    name: &str,
) -> Result<&'m PropertyMeta, InternalError> {
    meta.property(name)
        .ok_or_else(|| InternalError::unmapped_property(meta.name(), name))
}

pub(crate) fn counter_mutation(
    meta: &EntityMeta,
    key: &Value,
    prop: &PropertyMeta,
    delta: i64,
    level: ConsistencyLevel,
) -> Mutation {
    Mutation::new(
        TableName::counters(),
        RowKey::new(composite::counter_row_key(meta.name(), key, prop.name()).encode()),
        MutationOp::IncrementCounter {
            column: composite::single_column(prop).encode(),
            delta,
        },
        level,
    )
}

const fn value_label(value: &PropertyValue) -> &'static str {
    match value {
        PropertyValue::Simple(_) => "simple",
        PropertyValue::List(_) => "list",
        PropertyValue::Set(_) => "set",
        PropertyValue::Map(_) => "map",
        PropertyValue::Counter(_) => "counter",
        PropertyValue::Join(_) => "join",
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::store::memory::MemoryStore,
        error::ErrorClass,
        test_support::{self, RecordingStore},
    };

    fn setup() -> (SchemaRegistry, MemoryStore, FlushContext) {
        (test_support::registry(), MemoryStore::new(), FlushContext::new())
    }

    #[test]
    fn persist_writes_exactly_the_loaded_properties() {
        let (registry, mut store, mut ctx) = setup();
        let meta = registry.get("user").unwrap().clone();
        let persister = Persister::new(&registry);

        let record = Record::new("user", Value::Uint(42))
            .with("name", PropertyValue::Simple(Value::Text("ada".into())))
            .with("tags", PropertyValue::List(vec![
                Value::Text("a".into()),
                Value::Text("b".into()),
            ]));

        persister.persist(&mut store, &mut ctx, &meta, &record).unwrap();

        let key = Value::Uint(42).to_bytes();
        // name + two list elements, nothing else
        assert_eq!(store.column_count("users_cf", &key), 3);
    }

    #[test]
    fn declared_version_adds_a_marker_column() {
        let mut registry = SchemaRegistry::new();
        let meta = EntityMeta::builder()
            .name("doc")
            .storage_name("docs_cf")
            .id(
                PropertyMeta::builder()
                    .name("id")
                    .entity("doc")
                    .value_kind(crate::value::ValueKind::Uint)
                    .build()
                    .unwrap(),
            )
            .property(
                PropertyMeta::builder().name("title").entity("doc").build().unwrap(),
            )
            .version(3)
            .build()
            .unwrap();
        let meta = registry.register(meta).unwrap();

        let mut store = MemoryStore::new();
        let mut ctx = FlushContext::new();
        let record = Record::new("doc", Value::Uint(1))
            .with("title", PropertyValue::Simple(Value::Text("intro".into())));
        Persister::new(&registry)
            .persist(&mut store, &mut ctx, &meta, &record)
            .unwrap();

        let key = Value::Uint(1).to_bytes();
        assert_eq!(store.column_count("docs_cf", &key), 2);
        let marker = store
            .read_column(
                "docs_cf",
                &key,
                &composite::version_column().encode(),
                ConsistencyLevel::One,
            )
            .unwrap();
        assert!(marker.is_some());
    }

    #[test]
    fn not_loaded_properties_write_nothing() {
        let (registry, mut store, mut ctx) = setup();
        let meta = registry.get("user").unwrap().clone();
        let persister = Persister::new(&registry);

        let record = Record::new("user", Value::Uint(1));
        persister.persist(&mut store, &mut ctx, &meta, &record).unwrap();

        assert_eq!(store.column_count("users_cf", &Value::Uint(1).to_bytes()), 0);
    }

    #[test]
    fn empty_collections_write_nothing() {
        let (registry, mut store, mut ctx) = setup();
        let meta = registry.get("user").unwrap().clone();
        let persister = Persister::new(&registry);

        let record = Record::new("user", Value::Uint(1))
            .with("tags", PropertyValue::List(Vec::new()));
        persister.persist(&mut store, &mut ctx, &meta, &record).unwrap();

        assert_eq!(store.column_count("users_cf", &Value::Uint(1).to_bytes()), 0);
    }

    #[test]
    fn counter_writes_go_to_the_counter_row_space() {
        let (registry, mut store, mut ctx) = setup();
        let meta = registry.get("user").unwrap().clone();
        let persister = Persister::new(&registry);

        let record = Record::new("user", Value::Uint(42))
            .with("visits", PropertyValue::Counter(3));
        persister.persist(&mut store, &mut ctx, &meta, &record).unwrap();

        let counter_row =
            composite::counter_row_key("user", &Value::Uint(42), "visits").encode();
        let column = composite::single_column(meta.property("visits").unwrap()).encode();
        assert_eq!(
            store
                .read_counter(&counter_row, &column, ConsistencyLevel::One)
                .unwrap(),
            Some(3)
        );
    }

    #[test]
    fn shape_mismatch_is_misuse() {
        let (registry, mut store, mut ctx) = setup();
        let meta = registry.get("user").unwrap().clone();
        let persister = Persister::new(&registry);

        let record = Record::new("user", Value::Uint(1))
            .with("tags", PropertyValue::Simple(Value::Text("not-a-list".into())));
        let err = persister
            .persist(&mut store, &mut ctx, &meta, &record)
            .unwrap_err();
        assert_eq!(err.class, ErrorClass::StateMisuse);
    }

    #[test]
    fn unmapped_property_is_configuration_error() {
        let (registry, mut store, mut ctx) = setup();
        let meta = registry.get("user").unwrap().clone();
        let persister = Persister::new(&registry);

        let record = Record::new("user", Value::Uint(1));
        let err = persister
            .persist_property(&mut store, &mut ctx, &meta, &record, "ghost")
            .unwrap_err();
        assert_eq!(err.class, ErrorClass::Configuration);
    }

    #[test]
    fn cascade_persist_recurses_exactly_one_hop() {
        let (registry, mut store, mut ctx) = setup();
        let meta = registry.get("post").unwrap().clone();
        let persister = Persister::new(&registry);

        // post → author (user) → author again; the inner join must write
        // its FK column without persisting a third row.
        let inner_author = Record::new("user", Value::Uint(7));
        let author = Record::new("user", Value::Uint(7))
            .with("name", PropertyValue::Simple(Value::Text("ada".into())))
            .with("buddy", PropertyValue::Join(inner_author));
        let post = Record::new("post", Value::Uint(100))
            .with("author", PropertyValue::Join(author));

        persister.persist(&mut store, &mut ctx, &meta, &post).unwrap();

        // The cascaded author row was fully persisted (name + buddy FK).
        assert_eq!(store.column_count("users_cf", &Value::Uint(7).to_bytes()), 2);
        // The post row carries only the FK column.
        assert_eq!(store.column_count("posts_cf", &Value::Uint(100).to_bytes()), 1);
    }

    #[test]
    fn ensure_exists_errors_when_the_target_row_is_missing() {
        let (registry, mut store, mut ctx) = setup();
        let meta = registry.get("comment").unwrap().clone();
        let persister = Persister::new(&registry);

        let record = Record::new("comment", Value::Uint(5)).with(
            "parent",
            PropertyValue::Join(Record::new("post", Value::Uint(404))),
        );
        let err = persister
            .persist(&mut store, &mut ctx, &meta, &record)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn batched_persist_defers_every_mutation() {
        let (registry, _, mut ctx) = setup();
        let mut store = RecordingStore::default();
        let meta = registry.get("user").unwrap().clone();
        let persister = Persister::new(&registry);

        ctx.start_batch().unwrap();
        let record = Record::new("user", Value::Uint(1))
            .with("name", PropertyValue::Simple(Value::Text("ada".into())));
        persister.persist(&mut store, &mut ctx, &meta, &record).unwrap();

        assert!(store.submissions.borrow().is_empty());
        ctx.flush(&mut store).unwrap();
        assert_eq!(store.submissions.borrow().len(), 1);
        assert_eq!(store.submissions.borrow()[0].len(), 1);
    }

    #[test]
    fn consistency_resolution_prefers_context_then_property() {
        let registry = test_support::registry();
        let meta = registry.get("user").unwrap().clone();
        let mut ctx = FlushContext::new();

        // "name" carries a property-level Quorum write override.
        let prop = meta.property("name").unwrap();
        assert_eq!(write_level(&ctx, prop, &meta), ConsistencyLevel::Quorum);

        ctx.set_write_level(Some(ConsistencyLevel::All));
        assert_eq!(write_level(&ctx, prop, &meta), ConsistencyLevel::All);
    }
}
