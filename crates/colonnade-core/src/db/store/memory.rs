use crate::db::{
    consistency::ConsistencyLevel,
    mutation::{Mutation, MutationOp},
    store::{ColumnStore, StoreError},
};
use std::collections::BTreeMap;
use std::ops::Bound;

type Row = BTreeMap<Vec<u8>, Vec<u8>>;
type Table = BTreeMap<Vec<u8>, Row>;

///
/// MemoryStore
///
/// In-process reference store. Column order is the BTreeMap byte order,
/// which matches the comparator contract exactly; counters live in their
/// own row-space and merge by addition.
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, Table>,
    counters: BTreeMap<Vec<u8>, BTreeMap<Vec<u8>, i64>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of columns currently held by a row, zero if absent.
    #[must_use]
    pub fn column_count(&self, table: &str, row: &[u8]) -> usize {
        self.tables
            .get(table)
            .and_then(|t| t.get(row))
            .map_or(0, Row::len)
    }
}

impl ColumnStore for MemoryStore {
    fn apply(&mut self, mutation: Mutation) -> Result<(), StoreError> {
        let row_key = (*mutation.row).clone();

        match mutation.op {
            MutationOp::InsertColumn { column, value } => {
                self.tables
                    .entry(mutation.table.to_string())
                    .or_default()
                    .entry(row_key)
                    .or_default()
                    .insert(column, value);
            }
            MutationOp::IncrementCounter { column, delta } => {
                let cell = self
                    .counters
                    .entry(row_key)
                    .or_default()
                    .entry(column)
                    .or_insert(0);
                *cell = cell.wrapping_add(delta);
            }
            MutationOp::RemoveColumn { column } => {
                if let Some(row) = self
                    .tables
                    .get_mut(mutation.table.as_str())
                    .and_then(|t| t.get_mut(&row_key))
                {
                    row.remove(&column);
                }
            }
            MutationOp::RemoveColumnRange { start, end } => {
                if let Some(row) = self
                    .tables
                    .get_mut(mutation.table.as_str())
                    .and_then(|t| t.get_mut(&row_key))
                {
                    let doomed: Vec<Vec<u8>> = row
                        .range::<[u8], _>((
                            Bound::Included(start.as_slice()),
                            Bound::Excluded(end.as_slice()),
                        ))
                        .map(|(name, _)| name.clone())
                        .collect();
                    for name in doomed {
                        row.remove(&name);
                    }
                }
            }
            MutationOp::RemoveRow => {
                if let Some(table) = self.tables.get_mut(mutation.table.as_str()) {
                    table.remove(&row_key);
                }
            }
            MutationOp::RemoveCounterRow => {
                self.counters.remove(&row_key);
            }
        }

        Ok(())
    }

    fn apply_batch(&mut self, mutations: Vec<Mutation>) -> Result<(), StoreError> {
        for mutation in mutations {
            self.apply(mutation)?;
        }
        Ok(())
    }

    fn read_column(
        &self,
        table: &str,
        row: &[u8],
        column: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .tables
            .get(table)
            .and_then(|t| t.get(row))
            .and_then(|r| r.get(column))
            .cloned())
    }

    fn read_column_range(
        &self,
        table: &str,
        row: &[u8],
        start: &[u8],
        end: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        Ok(self
            .tables
            .get(table)
            .and_then(|t| t.get(row))
            .map(|r| {
                r.range::<[u8], _>((Bound::Included(start), Bound::Excluded(end)))
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn read_row(
        &self,
        table: &str,
        row: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        Ok(self
            .tables
            .get(table)
            .and_then(|t| t.get(row))
            .map(|r| r.iter().map(|(n, v)| (n.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn read_counter(
        &self,
        row: &[u8],
        column: &[u8],
        _level: ConsistencyLevel,
    ) -> Result<Option<i64>, StoreError> {
        Ok(self.counters.get(row).and_then(|r| r.get(column)).copied())
    }
}

///
/// TESTS
///
