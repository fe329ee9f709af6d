//! Shared fixtures for engine tests: a small registered schema and store
//! doubles that record or reject traffic.

use crate::{
    db::{
        consistency::ConsistencyLevel,
        mutation::Mutation,
        store::{ColumnStore, StoreError},
    },
    model::{
        entity::EntityMeta,
        property::{CascadeType, JoinMeta, PropertyKind, PropertyMeta},
        registry::SchemaRegistry,
    },
    value::ValueKind,
};
use std::cell::RefCell;

fn id(entity: &str) -> PropertyMeta {
    PropertyMeta::builder()
        .name("id")
        .entity(entity)
        .value_kind(ValueKind::Uint)
        .build()
        .unwrap()
}

/// A registry with three mutually-joined entities: user, post, comment.
pub(crate) fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();

    let user = EntityMeta::builder()
        .name("user")
        .storage_name("users_cf")
        .id(id("user"))
        .property(
            PropertyMeta::builder()
                .name("name")
                .entity("user")
                .value_kind(ValueKind::Text)
                .consistency(ConsistencyLevel::Quorum, ConsistencyLevel::Quorum)
                .build()
                .unwrap(),
        )
        .property(
            PropertyMeta::builder()
                .name("tags")
                .entity("user")
                .kind(PropertyKind::List)
                .value_kind(ValueKind::Text)
                .build()
                .unwrap(),
        )
        .property(
            PropertyMeta::builder()
                .name("visits")
                .entity("user")
                .kind(PropertyKind::Counter)
                .value_kind(ValueKind::Int)
                .build()
                .unwrap(),
        )
        .property(
            PropertyMeta::builder()
                .name("buddy")
                .entity("user")
                .kind(PropertyKind::JoinSimple(JoinMeta::new(
                    "user",
                    CascadeType::Persist,
                )))
                .value_kind(ValueKind::Uint)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let post = EntityMeta::builder()
        .name("post")
        .storage_name("posts_cf")
        .id(id("post"))
        .property(
            PropertyMeta::builder()
                .name("author")
                .entity("post")
                .kind(PropertyKind::JoinSimple(JoinMeta::new(
                    "user",
                    CascadeType::Persist,
                )))
                .value_kind(ValueKind::Uint)
                .build()
                .unwrap(),
        )
        .property(
            PropertyMeta::builder()
                .name("scores")
                .entity("post")
                .kind(PropertyKind::Map)
                .key_kind(ValueKind::Text)
                .value_kind(ValueKind::Int)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let comment = EntityMeta::builder()
        .name("comment")
        .storage_name("comments_cf")
        .id(id("comment"))
        .property(
            PropertyMeta::builder()
                .name("parent")
                .entity("comment")
                .kind(PropertyKind::JoinSimple(JoinMeta::new(
                    "post",
                    CascadeType::EnsureExists,
                )))
                .value_kind(ValueKind::Uint)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let timeline = EntityMeta::builder()
        .name("timeline")
        .storage_name("timelines_cf")
        .id(id("timeline"))
        .property(
            PropertyMeta::builder()
                .name("events")
                .entity("timeline")
                .kind(PropertyKind::WideMap)
                .key_kind(ValueKind::Timestamp)
                .value_kind(ValueKind::Text)
                .build()
                .unwrap(),
        )
        .wide_row()
        .build()
        .unwrap();

    registry.register(user).unwrap();
    registry.register(post).unwrap();
    registry.register(comment).unwrap();
    registry.register(timeline).unwrap();

    registry
}

///
/// RecordingStore
///
/// Store double that records traffic instead of holding data: immediate
/// applies and batch submissions land in separate logs, reads are empty.
///

#[derive(Debug, Default)]
pub(crate) struct RecordingStore {
    pub applied: RefCell<Vec<Mutation>>,
    pub submissions: RefCell<Vec<Vec<Mutation>>>,
}

impl ColumnStore for RecordingStore {
    fn apply(&mut self, mutation: Mutation) -> Result<(), StoreError> {
        self.applied.borrow_mut().push(mutation);
        Ok(())
    }

    fn apply_batch(&mut self, mutations: Vec<Mutation>) -> Result<(), StoreError> {
        self.submissions.borrow_mut().push(mutations);
        Ok(())
    }

    fn read_column(
        &self,
        _table: &str,
        _row: &[u8],
        _column: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(None)
    }

    fn read_column_range(
        &self,
        _table: &str,
        _row: &[u8],
        _start: &[u8],
        _end: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        Ok(Vec::new())
    }

    fn read_row(
        &self,
        _table: &str,
        _row: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        Ok(Vec::new())
    }

    fn read_counter(
        &self,
        _row: &[u8],
        _column: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<Option<i64>, StoreError> {
        Ok(None)
    }
}

///
/// RejectingStore
///
/// Store double whose writes always fail.
///

#[derive(Debug, Default)]
pub(crate) struct RejectingStore;

impl ColumnStore for RejectingStore {
    fn apply(&mut self, _mutation: Mutation) -> Result<(), StoreError> {
        Err(StoreError::Rejected {
            message: "write refused".to_string(),
        })
    }

    fn apply_batch(&mut self, _mutations: Vec<Mutation>) -> Result<(), StoreError> {
        Err(StoreError::Rejected {
            message: "batch refused".to_string(),
        })
    }

    fn read_column(
        &self,
        _table: &str,
        _row: &[u8],
        _column: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(None)
    }

    fn read_column_range(
        &self,
        _table: &str,
        _row: &[u8],
        _start: &[u8],
        _end: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        Ok(Vec::new())
    }

    fn read_row(
        &self,
        _table: &str,
        _row: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        Ok(Vec::new())
    }

    fn read_counter(
        &self,
        _row: &[u8],
        _column: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<Option<i64>, StoreError> {
        Ok(None)
    }
}
