use crate::db::consistency::ConsistencyLevel;
use derive_more::{Deref, Display};

/// Logical table holding every counter row. Counters never share a row
/// container with regular columns; their merge semantics differ.
pub const COUNTER_TABLE: &str = "_counters";

///
/// TableName
///

#[derive(Clone, Debug, Deref, Display, Eq, Ord, PartialEq, PartialOrd)]
pub struct TableName(String);

impl TableName {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn counters() -> Self {
        Self(COUNTER_TABLE.to_string())
    }
}

///
/// RowKey
///
/// Encoded row identifier. Regular rows carry an encoded primary-key
/// value; counter rows carry an encoded composite.
///

#[derive(Clone, Debug, Deref, Eq, Ord, PartialEq, PartialOrd)]
pub struct RowKey(Vec<u8>);

impl RowKey {
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

///
/// MutationOp
///
/// One primitive write. Column names and range bounds are comparator-form
/// composite encodings; the store compares them bytewise and never
/// interprets their structure.
///

#[derive(Clone, Debug, PartialEq)]
pub enum MutationOp {
    InsertColumn { column: Vec<u8>, value: Vec<u8> },
    IncrementCounter { column: Vec<u8>, delta: i64 },
    RemoveColumn { column: Vec<u8> },
    RemoveColumnRange { start: Vec<u8>, end: Vec<u8> },
    RemoveRow,
    RemoveCounterRow,
}

///
/// Mutation
///
/// A fully-resolved write: target container, row, operation and the write
/// consistency level it must be applied at. Once built, a mutation is
/// self-describing; no metadata lookup happens past this point.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Mutation {
    pub table: TableName,
    pub row: RowKey,
    pub op: MutationOp,
    pub level: ConsistencyLevel,
}

impl Mutation {
    #[must_use]
    pub const fn new(
        table: TableName,
        row: RowKey,
        op: MutationOp,
        level: ConsistencyLevel,
    ) -> Self {
        Self {
            table,
            row,
            op,
            level,
        }
    }
}
