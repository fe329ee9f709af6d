use super::*;
use crate::{
    model::property::{MultiKeyMeta, PropertyKind, PropertyMeta, PropertyMetaBuilder},
    value::{Value, ValueKind},
};
use proptest::prelude::*;

fn builder(name: &str) -> PropertyMetaBuilder {
    PropertyMeta::builder().name(name).entity("user")
}

fn simple(name: &str) -> PropertyMeta {
    builder(name).build().unwrap()
}

#[test]
fn encode_roundtrips() {
    let meta = simple("name");
    let column = single_column(&meta);

    let decoded = CompositeColumnName::try_from_bytes(&column.encode()).unwrap();
    assert_eq!(decoded, column);
    assert!(decoded.is_persistable());
}

#[test]
fn list_columns_order_by_index() {
    let meta = builder("tags").kind(PropertyKind::List).build().unwrap();

    let first = list_column(&meta, 0).encode();
    let second = list_column(&meta, 1).encode();
    let tenth = list_column(&meta, 9).encode();

    assert!(first < second);
    assert!(second < tenth);
}

#[test]
fn equal_discriminants_collide_by_design() {
    let meta = builder("roles").kind(PropertyKind::Set).build().unwrap();

    let a = hashed_column(&meta, &Value::Text("admin".into()));
    let b = hashed_column(&meta, &Value::Text("admin".into()));
    let c = hashed_column(&meta, &Value::Text("guest".into()));

    assert_eq!(a.encode(), b.encode());
    assert_ne!(a.encode(), c.encode());
}

#[test]
fn colliding_discriminants_leave_one_column_last_write_wins() {
    use crate::db::{
        consistency::ConsistencyLevel,
        mutation::{Mutation, MutationOp, RowKey, TableName},
        store::{ColumnStore, memory::MemoryStore},
    };

    // Two distinct values whose discriminants hash to the same word share
    // a column name; force that case by fixing the hash component.
    let shared = CompositeColumnName::from_fixed(vec![
        Component::equal(ComponentValue::Flag(PropertyKind::FLAG_SET)),
        Component::equal(ComponentValue::Text("roles".to_string())),
        Component::equal(ComponentValue::Hash(0x00DE_AD00_BEEF_0000)),
    ]);

    let mut store = MemoryStore::new();
    let insert = |element: &Value| {
        Mutation::new(
            TableName::new("users_cf"),
            RowKey::new(Value::Uint(1).to_bytes()),
            MutationOp::InsertColumn {
                column: shared.encode(),
                value: element.to_bytes(),
            },
            ConsistencyLevel::One,
        )
    };

    store.apply(insert(&Value::Text("admin".into()))).unwrap();
    store.apply(insert(&Value::Text("guest".into()))).unwrap();

    let key = Value::Uint(1).to_bytes();
    assert_eq!(store.column_count("users_cf", &key), 1);
    assert_eq!(
        store
            .read_column("users_cf", &key, &shared.encode(), ConsistencyLevel::One)
            .unwrap(),
        Some(Value::Text("guest".into()).to_bytes())
    );
}

#[test]
fn wide_map_key_is_validated_against_declared_shape() {
    let meta = builder("events")
        .kind(PropertyKind::WideMap)
        .multi_key(MultiKeyMeta::new(vec![ValueKind::Uint, ValueKind::Text]))
        .build()
        .unwrap();

    let ok = wide_map_column(&meta, &[Value::Uint(7), Value::Text("login".into())]);
    assert!(ok.is_ok());

    let arity = wide_map_column(&meta, &[Value::Uint(7)]).unwrap_err();
    assert!(matches!(arity, CompositeError::KeyArityMismatch { .. }));

    let kind = wide_map_column(&meta, &[Value::Text("x".into()), Value::Text("login".into())])
        .unwrap_err();
    assert!(matches!(
        kind,
        CompositeError::KeyKindMismatch { index: 0, .. }
    ));
}

#[test]
fn wide_map_single_key_uses_key_kind() {
    let meta = builder("events")
        .kind(PropertyKind::WideMap)
        .key_kind(ValueKind::Timestamp)
        .build()
        .unwrap();

    assert!(wide_map_column(&meta, &[Value::Timestamp(1700)]).is_ok());
    assert!(wide_map_column(&meta, &[Value::Uint(1700)]).is_err());
}

#[test]
fn property_range_brackets_only_that_property() {
    let list = builder("tags").kind(PropertyKind::List).build().unwrap();
    let (start, end) = property_range(&list);
    let (start, end) = (start.encode(), end.encode());

    for index in [0, 1, u64::MAX] {
        let column = list_column(&list, index).encode();
        assert!(start <= column, "element {index} below range start");
        assert!(column < end, "element {index} at or past range end");
    }

    // Same category, different property name: outside the range.
    let other = builder("titles").kind(PropertyKind::List).build().unwrap();
    let foreign = list_column(&other, 0).encode();
    assert!(foreign < start || foreign >= end);

    // Different category entirely: outside the range.
    let scalar = single_column(&simple("name")).encode();
    assert!(scalar < start || scalar >= end);
}

#[test]
fn version_column_sorts_before_every_property() {
    let version = version_column().encode();

    let scalar = single_column(&simple("aaa")).encode();
    let wide = builder("events")
        .kind(PropertyKind::WideMap)
        .key_kind(ValueKind::Uint)
        .build()
        .unwrap();
    let wide_col = wide_map_column(&wide, &[Value::Uint(0)]).unwrap().encode();

    assert!(version < scalar);
    assert!(version < wide_col);
}

#[test]
fn counter_row_keys_are_per_property() {
    let visits = counter_row_key("user", &Value::Uint(42), "visits");
    let clicks = counter_row_key("user", &Value::Uint(42), "clicks");
    let other_row = counter_row_key("user", &Value::Uint(43), "visits");

    assert_ne!(visits.encode(), clicks.encode());
    assert_ne!(visits.encode(), other_row.encode());
}

#[test]
fn corrupted_encodings_are_rejected() {
    let good = single_column(&simple("name")).encode();

    let mut truncated = good.clone();
    truncated.truncate(good.len() - 2);
    assert!(matches!(
        CompositeColumnName::try_from_bytes(&truncated),
        Err(CompositeError::Truncated)
    ));

    let mut bad_kind = good.clone();
    bad_kind[0] = 0xEE;
    assert!(matches!(
        CompositeColumnName::try_from_bytes(&bad_kind),
        Err(CompositeError::InvalidComponentKind { kind: 0xEE })
    ));

    let mut bad_eoc = good;
    let last = bad_eoc.len() - 1;
    bad_eoc[last] = 0x42;
    assert!(matches!(
        CompositeColumnName::try_from_bytes(&bad_eoc),
        Err(CompositeError::InvalidEquality { eoc: 0x42 })
    ));
}

#[test]
fn display_is_colon_separated() {
    let meta = builder("tags").kind(PropertyKind::List).build().unwrap();
    let column = list_column(&meta, 3);
    assert_eq!(column.to_string(), format!("#{}:tags:[3]", meta.kind().flag()));
}

fn discriminant_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::Uint),
        ".{0,16}".prop_map(Value::Text),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
    ]
}

proptest! {
    #[test]
    fn hashed_columns_roundtrip(discriminant in discriminant_strategy()) {
        let meta = builder("roles").kind(PropertyKind::Set).build().unwrap();
        let column = hashed_column(&meta, &discriminant);
        let decoded = CompositeColumnName::try_from_bytes(&column.encode()).unwrap();
        prop_assert_eq!(decoded, column);
    }

    #[test]
    fn every_list_element_falls_inside_its_property_range(index in any::<u64>()) {
        let meta = builder("tags").kind(PropertyKind::List).build().unwrap();
        let (start, end) = property_range(&meta);
        let column = list_column(&meta, index).encode();
        prop_assert!(start.encode() <= column);
        prop_assert!(column < end.encode());
    }
}
