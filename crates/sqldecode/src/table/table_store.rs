//! # Table Store

use std::io::BufRead;

use crate::{
    errors::{SDResult, SqlDecodeError},
    table::Table,
    types::{SDHashMap, hash_map_new},
};

/// Lookup of tables by id.
pub trait TableStore: Send + Sync {
    /// Get a table by id.
    ///
    /// ## Returns
    /// The table, or [`SqlDecodeError::UnknownTable`].
    fn table(
        &self,
        id: &str,
    ) -> SDResult<&Table>;
}

/// A [`TableStore`] held fully in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTableStore {
    tables: SDHashMap<String, Table>,
}

impl InMemoryTableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            tables: hash_map_new(),
        }
    }

    /// Load tables from line-delimited JSON, one table per line.
    ///
    /// Blank lines are skipped. Later tables replace earlier ones with the same id.
    pub fn from_jsonl<R: BufRead>(reader: R) -> SDResult<Self> {
        let mut store = Self::new();
        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            store.insert(serde_json::from_str(line)?);
        }
        log::debug!("loaded {} tables", store.len());
        Ok(store)
    }

    /// Insert a table, returning any table it replaced.
    pub fn insert(
        &mut self,
        table: Table,
    ) -> Option<Table> {
        self.tables.insert(table.id.clone(), table)
    }

    /// The number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Is the store empty?
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<Table> for InMemoryTableStore {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        let mut store = Self::new();
        for table in iter {
            store.insert(table);
        }
        store
    }
}

impl TableStore for InMemoryTableStore {
    fn table(
        &self,
        id: &str,
    ) -> SDResult<&Table> {
        self.tables
            .get(id)
            .ok_or_else(|| SqlDecodeError::UnknownTable(id.to_string()))
    }
}
