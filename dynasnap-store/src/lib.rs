//! # dynasnap-store
//!
//! Snapshot storage for event-sourced aggregates.
//!
//! This crate provides:
//! - [`SnapshotStore`], a stateless facade that writes and reads one snapshot
//!   per `(aggregate_id, revision)` key
//! - The [`SnapshotTable`] collaborator trait with a DynamoDB implementation
//!   ([`DynamoTable`]) and an in-process one ([`MemoryTable`])
//! - Table provisioning (create, delete, describe)
//! - A pluggable [`Clock`] for snapshot timestamps
//!
//! ```no_run
//! use dynasnap_store::{SnapshotStore, StoreConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoreConfig::default().with_endpoint("http://localhost:8000");
//! let store = SnapshotStore::connect(&config).await?;
//!
//! store.create_table().await?;
//! store.store("order-1", 12, 1, &"paid").await?;
//! let snapshot = store.fetch("order-1", 12).await?;
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod config;
pub mod dynamo;
pub mod error;
pub mod item;
pub mod memory;
pub mod snapshot;
pub mod store;
pub mod table;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, StoreConfig, ThroughputConfig};
pub use dynamo::DynamoTable;
pub use error::{StoreError, TableError};
pub use memory::MemoryTable;
pub use snapshot::{Snapshot, SnapshotKey};
pub use store::SnapshotStore;
pub use table::{SnapshotTable, TableStatus};
