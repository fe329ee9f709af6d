//! Explicit property loads. Nothing is fetched lazily; a caller asks for
//! one property and gets its `Loaded` state installed on the record.

use crate::{
    db::{
        codec::decode_map_entry,
        composite,
        consistency::{self, ConsistencyLevel},
        flush::FlushContext,
        persist::{check_record, mapped_property},
        record::{PropertyValue, Record},
        store::ColumnStore,
    },
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::{
        entity::EntityMeta,
        property::{PropertyKind, PropertyMeta},
    },
    obs::sink::{self, MetricsEvent, OpKind},
};

///
/// Loader
///

#[derive(Debug, Default)]
pub struct Loader;

impl Loader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Read one property back from the store and install it on the record.
    ///
    /// Returns `false` and leaves the property `NotLoaded` when the store
    /// holds nothing for it. Reads always execute synchronously, tagged
    /// with the resolved read consistency, regardless of batching.
    pub fn load_property<S: ColumnStore>(
        &self,
        store: &S,
        ctx: &FlushContext,
        meta: &EntityMeta,
        record: &mut Record,
        name: &str,
    ) -> Result<bool, InternalError> {
        check_record(meta, record)?;
        let prop = mapped_property(meta, name)?;

        sink::record(MetricsEvent::OpStart {
            kind: OpKind::Load,
            entity: meta.name().to_string(),
        });

        let level = consistency::resolve(ctx.read_level(), prop.read_override(), meta.read_default());
        let table = meta.storage_name();
        let key = record.key().to_bytes();

        let loaded = match prop.kind() {
            PropertyKind::Simple => store
                .read_column(table, &key, &composite::single_column(prop).encode(), level)?
                .map(|bytes| prop.codec().decode(prop.value_kind(), &bytes).map(PropertyValue::Simple))
                .transpose()?,

            PropertyKind::JoinSimple(join) => store
                .read_column(table, &key, &composite::single_column(prop).encode(), level)?
                .map(|bytes| {
                    let fk = prop.codec().decode(prop.value_kind(), &bytes)?;
                    Ok::<_, InternalError>(PropertyValue::Join(Record::new(
                        join.target_entity.clone(),
                        fk,
                    )))
                })
                .transpose()?,

            PropertyKind::Counter => {
                let counter_row =
                    composite::counter_row_key(meta.name(), record.key(), prop.name()).encode();
                store
                    .read_counter(&counter_row, &composite::single_column(prop).encode(), level)?
                    .map(PropertyValue::Counter)
            }

            PropertyKind::List => {
                let columns = read_range(store, table, &key, prop, level)?;
                if columns.is_empty() {
                    None
                } else {
                    let mut elements = Vec::with_capacity(columns.len());
                    for (_, bytes) in columns {
                        elements.push(prop.codec().decode(prop.value_kind(), &bytes)?);
                    }
                    Some(PropertyValue::List(elements))
                }
            }

            PropertyKind::Set => {
                let columns = read_range(store, table, &key, prop, level)?;
                if columns.is_empty() {
                    None
                } else {
                    let mut elements = Vec::with_capacity(columns.len());
                    for (_, bytes) in columns {
                        elements.push(prop.codec().decode(prop.value_kind(), &bytes)?);
                    }
                    Some(PropertyValue::Set(elements))
                }
            }

            PropertyKind::Map => {
                let columns = read_range(store, table, &key, prop, level)?;
                if columns.is_empty() {
                    None
                } else {
                    let mut entries = Vec::with_capacity(columns.len());
                    for (_, bytes) in columns {
                        entries.push(decode_map_entry(&bytes)?);
                    }
                    Some(PropertyValue::Map(entries))
                }
            }

            PropertyKind::WideMap
            | PropertyKind::JoinWideMap(_)
            | PropertyKind::CounterWideMap => {
                return Err(InternalError::new(
                    ErrorClass::StateMisuse,
                    ErrorOrigin::Load,
                    format!("wide-map property '{name}' is not loaded through the row path"),
                ));
            }
        };

        match loaded {
            Some(value) => {
                record.install(name, value);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

type Columns = Vec<(Vec<u8>, Vec<u8>)>;

fn read_range<S: ColumnStore>(
    store: &S,
    table: &str,
    key: &[u8],
    prop: &PropertyMeta,
    level: ConsistencyLevel,
) -> Result<Columns, InternalError> {
    let (start, end) = composite::property_range(prop);
    Ok(store.read_column_range(table, key, &start.encode(), &end.encode(), level)?)
}

///
/// TESTS
///
