//! In-process snapshot table.

use crate::error::TableError;
use crate::snapshot::{Snapshot, SnapshotKey};
use crate::table::{SnapshotTable, TableStatus};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A [`SnapshotTable`] held in memory.
///
/// Mirrors the service's observable behavior: the table must be created
/// before use, creating it twice or deleting a missing table fails, and
/// item operations on a missing table report `TableNotFound`.
pub struct MemoryTable {
    name: String,
    /// `None` while the table is not provisioned.
    items: RwLock<Option<HashMap<SnapshotKey, Snapshot>>>,
}

impl MemoryTable {
    /// Creates a handle to a table that does not exist yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: RwLock::new(None),
        }
    }

    /// Creates a handle to an already provisioned, empty table.
    pub fn provisioned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: RwLock::new(Some(HashMap::new())),
        }
    }

    /// Returns the number of stored snapshots, or `None` if the table does
    /// not exist.
    pub fn snapshot_count(&self) -> Option<usize> {
        self.items.read().as_ref().map(HashMap::len)
    }

    fn not_found(&self) -> TableError {
        TableError::TableNotFound(self.name.clone())
    }
}

#[async_trait]
impl SnapshotTable for MemoryTable {
    fn table_name(&self) -> &str {
        &self.name
    }

    async fn create_table(&self) -> Result<(), TableError> {
        let mut items = self.items.write();
        if items.is_some() {
            return Err(TableError::TableExists(self.name.clone()));
        }
        *items = Some(HashMap::new());
        Ok(())
    }

    async fn delete_table(&self) -> Result<(), TableError> {
        self.items
            .write()
            .take()
            .map(|_| ())
            .ok_or_else(|| self.not_found())
    }

    async fn table_status(&self) -> Result<Option<TableStatus>, TableError> {
        Ok(self.items.read().as_ref().map(|_| TableStatus::Active))
    }

    async fn put_item(&self, snapshot: &Snapshot) -> Result<(), TableError> {
        let mut items = self.items.write();
        let table = items.as_mut().ok_or_else(|| self.not_found())?;
        table.insert(snapshot.key(), snapshot.clone());
        Ok(())
    }

    async fn get_item(&self, key: &SnapshotKey) -> Result<Option<Snapshot>, TableError> {
        let items = self.items.read();
        let table = items.as_ref().ok_or_else(|| self.not_found())?;
        Ok(table.get(key).cloned())
    }
}
