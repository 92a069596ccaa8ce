//! Snapshot records.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Primary key of a snapshot: partition `aggregate_id`, sort `revision`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotKey {
    pub aggregate_id: String,
    pub revision: u64,
}

impl SnapshotKey {
    pub fn new(aggregate_id: impl Into<String>, revision: u64) -> Self {
        Self {
            aggregate_id: aggregate_id.into(),
            revision,
        }
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.aggregate_id, self.revision)
    }
}

/// Materialized state of an aggregate at a revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub aggregate_id: String,
    pub created_at: i64,
    pub revision: u64,
    /// Format version of `state`.
    pub version: i64,
    pub state: Value,
}

impl Snapshot {
    /// Returns the key this snapshot is stored under.
    pub fn key(&self) -> SnapshotKey {
        SnapshotKey::new(self.aggregate_id.clone(), self.revision)
    }

    /// Decodes the opaque state into a concrete type.
    pub fn state_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.state)
    }
}
