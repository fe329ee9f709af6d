//! Remove path: row tombstones plus the per-property tombstones that the
//! row tombstone cannot cover, because counters and ordinary columns are
//! removed through different store operations.

use crate::{
    db::{
        composite,
        consistency::{self, ConsistencyLevel},
        flush::FlushContext,
        mutation::{Mutation, MutationOp, RowKey, TableName},
        persist::mapped_property,
        store::ColumnStore,
    },
    error::InternalError,
    model::{
        entity::EntityMeta,
        property::{PropertyKind, PropertyMeta},
    },
    obs::sink::{self, MetricsEvent, OpKind, TombstoneKind},
    value::Value,
};

///
/// Remover
///

#[derive(Debug, Default)]
pub struct Remover;

impl Remover {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Remove an entire entity row by primary key.
    ///
    /// A wide-row entity is one row tombstone and nothing else. A regular
    /// entity additionally drops one column range per collection or
    /// wide-map property and one counter row per counter property.
    pub fn remove<S: ColumnStore>(
        &self,
        store: &mut S,
        ctx: &mut FlushContext,
        meta: &EntityMeta,
        key: &Value,
    ) -> Result<(), InternalError> {
        check_key(meta, key)?;
        sink::record(MetricsEvent::OpStart {
            kind: OpKind::Remove,
            entity: meta.name().to_string(),
        });

        let level = consistency::resolve(ctx.write_level(), None, meta.write_default());
        let table = TableName::new(meta.storage_name());
        let row = RowKey::new(key.to_bytes());

        ctx.push(
            store,
            Mutation::new(table.clone(), row.clone(), MutationOp::RemoveRow, level),
        )?;
        sink::record(MetricsEvent::Tombstone {
            kind: TombstoneKind::Row,
            count: 1,
        });

        if meta.is_wide_row() {
            return Ok(());
        }

        for prop in meta.properties() {
            if prop.is_counter() {
                ctx.push(store, counter_row_tombstone(meta, key, prop, level))?;
                sink::record(MetricsEvent::Tombstone {
                    kind: TombstoneKind::CounterRow,
                    count: 1,
                });
            } else if is_ranged(prop.kind()) {
                ctx.push(store, range_tombstone(&table, &row, prop, level))?;
                sink::record(MetricsEvent::Tombstone {
                    kind: TombstoneKind::Range,
                    count: 1,
                });
            }
        }

        Ok(())
    }

    /// Remove one named property of a row.
    pub fn remove_property<S: ColumnStore>(
        &self,
        store: &mut S,
        ctx: &mut FlushContext,
        meta: &EntityMeta,
        key: &Value,
        name: &str,
    ) -> Result<(), InternalError> {
        check_key(meta, key)?;
        let prop = mapped_property(meta, name)?;

        sink::record(MetricsEvent::OpStart {
            kind: OpKind::Remove,
            entity: meta.name().to_string(),
        });

        let level = consistency::resolve(ctx.write_level(), prop.write_override(), meta.write_default());
        let table = TableName::new(meta.storage_name());
        let row = RowKey::new(key.to_bytes());

        if prop.is_counter() {
            ctx.push(store, counter_row_tombstone(meta, key, prop, level))?;
            sink::record(MetricsEvent::Tombstone {
                kind: TombstoneKind::CounterRow,
                count: 1,
            });
        } else if is_ranged(prop.kind()) {
            ctx.push(store, range_tombstone(&table, &row, prop, level))?;
            sink::record(MetricsEvent::Tombstone {
                kind: TombstoneKind::Range,
                count: 1,
            });
        } else {
            ctx.push(
                store,
                Mutation::new(
                    table,
                    row,
                    MutationOp::RemoveColumn {
                        column: composite::single_column(prop).encode(),
                    },
                    level,
                ),
            )?;
        }

        Ok(())
    }
}

// Collections and wide maps span a column range; scalars do not.
const fn is_ranged(kind: &PropertyKind) -> bool {
    matches!(
        kind,
        PropertyKind::List
            | PropertyKind::Set
            | PropertyKind::Map
            | PropertyKind::WideMap
            | PropertyKind::JoinWideMap(_)
    )
}

fn range_tombstone(
    table: &TableName,
    row: &RowKey,
    prop: &PropertyMeta,
    level: ConsistencyLevel,
) -> Mutation {
    let (start, end) = composite::property_range(prop);
    Mutation::new(
        table.clone(),
        row.clone(),
        MutationOp::RemoveColumnRange {
            start: start.encode(),
            end: end.encode(),
        },
        level,
    )
}

fn counter_row_tombstone(
    meta: &EntityMeta,
    key: &Value,
    prop: &PropertyMeta,
    level: ConsistencyLevel,
) -> Mutation {
    Mutation::new(
        TableName::counters(),
        RowKey::new(composite::counter_row_key(meta.name(), key, prop.name()).encode()),
        MutationOp::RemoveCounterRow,
        level,
    )
}

fn check_key(meta: &EntityMeta, key: &Value) -> Result<(), InternalError> {
    if key.kind() == meta.id().value_kind() {
        Ok(())
    } else {
        Err(InternalError::persist_misuse(format!(
            "primary key kind {} does not match declared {}",
            key.kind(),
            meta.id().value_kind(),
        )))
    }
}

///
/// TESTS
///
