//! Key-value table collaborator.
//!
//! The store delegates all durability to a [`SnapshotTable`]. Each method is
//! a single request/response exchange with the backing service; there is no
//! batching, pagination or retry at this layer.

use crate::error::TableError;
use crate::snapshot::{Snapshot, SnapshotKey};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Lifecycle status of the backing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Active,
    Updating,
    Deleting,
    /// A status this crate does not model (archival, inaccessible keys, ...).
    Other(String),
}

impl TableStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, TableStatus::Active)
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableStatus::Creating => f.write_str("CREATING"),
            TableStatus::Active => f.write_str("ACTIVE"),
            TableStatus::Updating => f.write_str("UPDATING"),
            TableStatus::Deleting => f.write_str("DELETING"),
            TableStatus::Other(s) => f.write_str(s),
        }
    }
}

/// A table keyed by `(aggregateId, revision)` holding one snapshot per key.
#[async_trait]
pub trait SnapshotTable: Send + Sync {
    /// Name of the table all operations target.
    fn table_name(&self) -> &str;

    /// Creates the table with partition key `aggregateId` and sort key
    /// `revision`.
    ///
    /// # Errors
    /// * `TableError::TableExists` - the table is already provisioned
    /// * `TableError::Service` - the service rejected the request
    async fn create_table(&self) -> Result<(), TableError>;

    /// Deletes the table and every snapshot in it.
    ///
    /// # Errors
    /// * `TableError::TableNotFound` - there is no such table
    /// * `TableError::Service` - the service rejected the request
    async fn delete_table(&self) -> Result<(), TableError>;

    /// Describes the table. Returns `None` if it does not exist.
    async fn table_status(&self) -> Result<Option<TableStatus>, TableError>;

    /// Writes the snapshot, replacing any item with the same key.
    async fn put_item(&self, snapshot: &Snapshot) -> Result<(), TableError>;

    /// Reads the snapshot for `key`. Returns `None` if no item exists.
    async fn get_item(&self, key: &SnapshotKey) -> Result<Option<Snapshot>, TableError>;
}

/// Lets several stores (for example with different clocks) share one table.
#[async_trait]
impl<T: SnapshotTable + ?Sized> SnapshotTable for Arc<T> {
    fn table_name(&self) -> &str {
        (**self).table_name()
    }

    async fn create_table(&self) -> Result<(), TableError> {
        (**self).create_table().await
    }

    async fn delete_table(&self) -> Result<(), TableError> {
        (**self).delete_table().await
    }

    async fn table_status(&self) -> Result<Option<TableStatus>, TableError> {
        (**self).table_status().await
    }

    async fn put_item(&self, snapshot: &Snapshot) -> Result<(), TableError> {
        (**self).put_item(snapshot).await
    }

    async fn get_item(&self, key: &SnapshotKey) -> Result<Option<Snapshot>, TableError> {
        (**self).get_item(key).await
    }
}
