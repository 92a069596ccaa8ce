//! Snapshot store facade.

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::dynamo::DynamoTable;
use crate::error::{StoreError, TableError};
use crate::snapshot::{Snapshot, SnapshotKey};
use crate::table::{SnapshotTable, TableStatus};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Persists and retrieves aggregate snapshots.
///
/// The store keeps no state between calls beyond its table handle and
/// clock. Every operation is one request against the table; writes are
/// unconditional, so concurrent writes to the same key resolve as
/// last-write-wins at the service.
pub struct SnapshotStore<T = DynamoTable> {
    table: T,
    clock: Arc<dyn Clock>,
}

impl SnapshotStore<DynamoTable> {
    /// Connects to DynamoDB (or the configured emulator endpoint).
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let table = DynamoTable::connect(config).await?;
        Ok(Self::new(table))
    }
}

impl<T: SnapshotTable> SnapshotStore<T> {
    /// Creates a store over `table` using the wall clock.
    pub fn new(table: T) -> Self {
        Self {
            table,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for `created_at`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Returns the backing table.
    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn table_name(&self) -> &str {
        self.table.table_name()
    }

    /// Creates the backing table.
    ///
    /// Resolves once the service acknowledges the request. The table may
    /// still be provisioning; see [`wait_until_active`](Self::wait_until_active).
    pub async fn create_table(&self) -> Result<(), StoreError> {
        self.table
            .create_table()
            .await
            .map_err(|source| self.provisioning_error(source))
    }

    /// Deletes the backing table and all snapshots in it.
    pub async fn delete_table(&self) -> Result<(), StoreError> {
        self.table
            .delete_table()
            .await
            .map_err(|source| self.provisioning_error(source))
    }

    /// Returns the table's lifecycle status, or `None` if it does not exist.
    pub async fn table_status(&self) -> Result<Option<TableStatus>, StoreError> {
        self.table
            .table_status()
            .await
            .map_err(|source| self.provisioning_error(source))
    }

    /// Polls the table status until it is `ACTIVE`.
    ///
    /// Fails with `TableError::NotActive` once `timeout` has elapsed.
    pub async fn wait_until_active(
        &self,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<(), StoreError> {
        let started = Instant::now();
        loop {
            let status = self.table_status().await?;
            if status.as_ref().is_some_and(TableStatus::is_active) {
                return Ok(());
            }

            if started.elapsed() >= timeout {
                return Err(self.provisioning_error(TableError::NotActive {
                    table: self.table_name().to_string(),
                    waited_ms: started.elapsed().as_millis() as u64,
                }));
            }

            tracing::debug!(
                "Waiting for table {} (status: {})",
                self.table_name(),
                status.map_or_else(|| "absent".to_string(), |s| s.to_string())
            );
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Writes the snapshot for `(aggregate_id, revision)`, replacing any
    /// previous one. `created_at` is taken from the store's clock.
    pub async fn store<S>(
        &self,
        aggregate_id: &str,
        revision: u64,
        version: i64,
        state: &S,
    ) -> Result<(), StoreError>
    where
        S: Serialize + ?Sized,
    {
        let write_error = |source: TableError| StoreError::Write {
            aggregate_id: aggregate_id.to_string(),
            revision,
            source,
        };

        let state = serde_json::to_value(state).map_err(|e| write_error(e.into()))?;
        let snapshot = Snapshot {
            aggregate_id: aggregate_id.to_string(),
            created_at: self.clock.now(),
            revision,
            version,
            state,
        };

        self.table.put_item(&snapshot).await.map_err(write_error)?;

        tracing::debug!(
            "Stored snapshot {} v{} at {}",
            snapshot.key(),
            version,
            snapshot.created_at
        );
        Ok(())
    }

    /// Reads the snapshot for `(aggregate_id, revision)`.
    ///
    /// Returns `Ok(None)` when no snapshot has been written for the key.
    pub async fn fetch(
        &self,
        aggregate_id: &str,
        revision: u64,
    ) -> Result<Option<Snapshot>, StoreError> {
        let key = SnapshotKey::new(aggregate_id, revision);
        let snapshot = self
            .table
            .get_item(&key)
            .await
            .map_err(|source| StoreError::Read {
                aggregate_id: aggregate_id.to_string(),
                revision,
                source,
            })?;

        tracing::debug!(
            "Fetched snapshot {} ({})",
            key,
            if snapshot.is_some() { "hit" } else { "miss" }
        );
        Ok(snapshot)
    }

    fn provisioning_error(&self, source: TableError) -> StoreError {
        StoreError::Provisioning {
            table: self.table_name().to_string(),
            source,
        }
    }
}
