//! Store boundary: the trait the engine writes through and reads from.
//!
//! Everything above this line works in encoded bytes and fully-resolved
//! [`Mutation`]s; a store implementation only needs bytewise-ordered
//! columns, a counter row-space and batch application.

pub mod memory;

use crate::db::{consistency::ConsistencyLevel, mutation::Mutation};
use thiserror::Error as ThisError;

///
/// StoreError
///

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("store rejected the operation: {message}")]
    Rejected { message: String },

    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

///
/// ColumnStore
///
/// Row container abstraction: tables of rows, rows of bytewise-ordered
/// columns, plus a separate counter row-space. `apply_batch` is one
/// submission; implementations decide its atomicity.
///

pub trait ColumnStore {
    /// Apply one mutation immediately.
    fn apply(&mut self, mutation: Mutation) -> Result<(), StoreError>;

    /// Apply an ordered group of mutations as a single submission.
    fn apply_batch(&mut self, mutations: Vec<Mutation>) -> Result<(), StoreError>;

    /// Read one column by exact name, at the given consistency level.
    fn read_column(
        &self,
        table: &str,
        row: &[u8],
        column: &[u8],
        level: ConsistencyLevel,
    ) -> Result<Option<Vec<u8>>, StoreError>;

    /// Read the columns of a row whose names fall in `[start, end)`,
    /// in comparator order.
    fn read_column_range(
        &self,
        table: &str,
        row: &[u8],
        start: &[u8],
        end: &[u8],
        level: ConsistencyLevel,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;

    /// Read every column of a row, in comparator order.
    fn read_row(
        &self,
        table: &str,
        row: &[u8],
        level: ConsistencyLevel,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;

    /// Read one counter cell from the counter row-space.
    fn read_counter(
        &self,
        row: &[u8],
        column: &[u8],
        level: ConsistencyLevel,
    ) -> Result<Option<i64>, StoreError>;
}
