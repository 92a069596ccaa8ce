//! Shared test suite for snapshot tables
//!
//! Every [`SnapshotTable`] implementation must pass these tests so the store
//! behaves the same whichever collaborator backs it.
//!
//! # Usage
//!
//! ```ignore
//! let table = Arc::new(MemoryTable::provisioned("snapshots"));
//! common::run_all_tests(table).await;
//! ```
//!
//! The table must be provisioned and empty when the suite starts.

#![allow(dead_code)]

use dynasnap_store::{Snapshot, SnapshotStore, SnapshotTable};
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

pub const AGGREGATE_A: &str = "00000000-0000-0000-0000-000000000000";
pub const AGGREGATE_B: &str = "11111111-1111-1111-1111-111111111111";
pub const AGGREGATE_C: &str = "22222222-2222-2222-2222-222222222222";

/// Store whose clock returns 0, 1, 2, ... on successive writes.
pub fn counting_store<T: SnapshotTable>(table: T) -> SnapshotStore<T> {
    let now = AtomicI64::new(0);
    SnapshotStore::new(table).with_clock(move || now.fetch_add(1, Ordering::SeqCst))
}

/// Store whose clock always returns `at`.
pub fn fixed_store<T: SnapshotTable>(table: T, at: i64) -> SnapshotStore<T> {
    SnapshotStore::new(table).with_clock(move || at)
}

/// Run the whole suite against one provisioned table.
pub async fn run_all_tests<T: SnapshotTable + 'static>(table: Arc<T>) {
    seed(&table).await;

    test_fetch_never_written(&table).await;
    test_fetch_single_snapshot(&table).await;
    test_fetch_other_aggregate(&table).await;
    test_update_snapshot(&table).await;
    test_revisions_are_separate_keys(&table).await;
    test_structured_state(&table).await;
}

/// Store A and B at revision 0 with clock ticks 0 and 1.
pub async fn seed<T: SnapshotTable + 'static>(table: &Arc<T>) {
    let store = counting_store(table.clone());

    store
        .store(AGGREGATE_A, 0, 1, "one")
        .await
        .expect("storing A should succeed");
    store
        .store(AGGREGATE_B, 0, 1, "two")
        .await
        .expect("storing B should succeed");
}

/// A key nobody wrote reads back as `None`, not as an error.
pub async fn test_fetch_never_written<T: SnapshotTable + 'static>(table: &Arc<T>) {
    let store = SnapshotStore::new(table.clone());

    let snapshot = store
        .fetch(AGGREGATE_C, 0)
        .await
        .expect("fetch of a missing snapshot should succeed");
    assert_eq!(snapshot, None);
}

pub async fn test_fetch_single_snapshot<T: SnapshotTable + 'static>(table: &Arc<T>) {
    let store = SnapshotStore::new(table.clone());

    let snapshot = store
        .fetch(AGGREGATE_A, 0)
        .await
        .expect("fetch should succeed")
        .expect("snapshot A should exist");

    assert_eq!(
        snapshot,
        Snapshot {
            aggregate_id: AGGREGATE_A.to_string(),
            created_at: 0,
            revision: 0,
            version: 1,
            state: json!("one"),
        }
    );
}

/// Writing B must not leak into A and vice versa.
pub async fn test_fetch_other_aggregate<T: SnapshotTable + 'static>(table: &Arc<T>) {
    let store = SnapshotStore::new(table.clone());

    let snapshot = store
        .fetch(AGGREGATE_B, 0)
        .await
        .expect("fetch should succeed")
        .expect("snapshot B should exist");

    assert_eq!(snapshot.aggregate_id, AGGREGATE_B);
    assert_eq!(snapshot.created_at, 1);
    assert_eq!(snapshot.state, json!("two"));
}

/// A second write to the same key replaces state and timestamp.
pub async fn test_update_snapshot<T: SnapshotTable + 'static>(table: &Arc<T>) {
    let store = fixed_store(table.clone(), 2);

    store
        .store(AGGREGATE_A, 0, 1, "three")
        .await
        .expect("update should succeed");

    let snapshot = store
        .fetch(AGGREGATE_A, 0)
        .await
        .expect("fetch should succeed")
        .expect("snapshot A should exist");

    assert_eq!(
        snapshot,
        Snapshot {
            aggregate_id: AGGREGATE_A.to_string(),
            created_at: 2,
            revision: 0,
            version: 1,
            state: json!("three"),
        }
    );

    let other = store
        .fetch(AGGREGATE_B, 0)
        .await
        .expect("fetch should succeed")
        .expect("snapshot B should exist");
    assert_eq!(other.state, json!("two"));
}

pub async fn test_revisions_are_separate_keys<T: SnapshotTable + 'static>(table: &Arc<T>) {
    let store = fixed_store(table.clone(), 10);

    store
        .store(AGGREGATE_C, 5, 1, "five")
        .await
        .expect("store should succeed");
    store
        .store(AGGREGATE_C, 9, 2, "nine")
        .await
        .expect("store should succeed");

    let five = store.fetch(AGGREGATE_C, 5).await.unwrap().unwrap();
    let nine = store.fetch(AGGREGATE_C, 9).await.unwrap().unwrap();
    assert_eq!((five.version, five.state), (1, json!("five")));
    assert_eq!((nine.version, nine.state), (2, json!("nine")));

    assert_eq!(store.fetch(AGGREGATE_C, 0).await.unwrap(), None);
    assert_eq!(store.fetch(AGGREGATE_C, 7).await.unwrap(), None);
}

pub async fn test_structured_state<T: SnapshotTable + 'static>(table: &Arc<T>) {
    let store = fixed_store(table.clone(), 1_700_000_000_000);
    let state = json!({
        "status": "shipped",
        "lines": [{"sku": "A-1", "qty": 2, "price": 9.5}, {"sku": "B-2", "qty": 1, "price": 10.0}],
        "customer": {"id": 42, "vip": true, "note": null}
    });

    store
        .store("order-77", 12, 3, &state)
        .await
        .expect("store should succeed");

    let snapshot = store
        .fetch("order-77", 12)
        .await
        .expect("fetch should succeed")
        .expect("snapshot should exist");
    assert_eq!(snapshot.state, state);
    assert!(snapshot.state["lines"][1]["price"].is_f64());
    assert_eq!(snapshot.created_at, 1_700_000_000_000);
    assert_eq!(snapshot.version, 3);
}
