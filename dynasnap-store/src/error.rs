//! Store and table error types.

use crate::config::ConfigError;
use std::error::Error as StdError;
use thiserror::Error;

/// Boxed error for wrapping SDK-specific failures.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Errors reported by a [`SnapshotTable`](crate::table::SnapshotTable).
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table already exists: {0}")]
    TableExists(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table {table} did not become active within {waited_ms}ms")]
    NotActive { table: String, waited_ms: u64 },

    #[error("{operation} failed: {source}")]
    Service {
        operation: &'static str,
        retryable: bool,
        #[source]
        source: BoxedError,
    },

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid item: {0}")]
    InvalidItem(String),
}

impl TableError {
    /// Wraps a collaborator failure for the named operation.
    pub fn service(operation: &'static str, source: impl StdError + Send + Sync + 'static) -> Self {
        Self::Service {
            operation,
            retryable: false,
            source: Box::new(source),
        }
    }

    /// Wraps a collaborator failure that the service flagged as transient
    /// (throttling, capacity exceeded).
    pub fn throttled(
        operation: &'static str,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Service {
            operation,
            retryable: true,
            source: Box::new(source),
        }
    }

    /// Returns whether the caller may retry. The store itself never does.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TableError::Service { retryable: true, .. })
    }
}

/// Errors from [`SnapshotStore`](crate::store::SnapshotStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("provisioning table {table} failed: {source}")]
    Provisioning {
        table: String,
        #[source]
        source: TableError,
    },

    #[error("writing snapshot {aggregate_id}@{revision} failed: {source}")]
    Write {
        aggregate_id: String,
        revision: u64,
        #[source]
        source: TableError,
    },

    #[error("reading snapshot {aggregate_id}@{revision} failed: {source}")]
    Read {
        aggregate_id: String,
        revision: u64,
        #[source]
        source: TableError,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl StoreError {
    /// Returns the underlying table error, if any.
    pub fn table_error(&self) -> Option<&TableError> {
        match self {
            StoreError::Provisioning { source, .. }
            | StoreError::Write { source, .. }
            | StoreError::Read { source, .. } => Some(source),
            StoreError::Config(_) => None,
        }
    }

    /// Returns whether this error is retryable.
    pub fn is_retryable(&self) -> bool {
        self.table_error().is_some_and(TableError::is_retryable)
    }
}
