//! Conversion between snapshots and DynamoDB items.
//!
//! Item layout:
//!
//! | attribute     | type | role           |
//! |---------------|------|----------------|
//! | `aggregateId` | S    | partition key  |
//! | `revision`    | N    | sort key       |
//! | `version`     | N    |                |
//! | `createdAt`   | N    |                |
//! | `state`       | S    | JSON text      |
//!
//! `state` is kept as compact JSON text. Native N attributes are normalized
//! by the service (`10.0` reads back as `10`), which would change the value
//! a caller gets back from `fetch`.

use crate::error::TableError;
use crate::snapshot::{Snapshot, SnapshotKey};
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use std::str::FromStr;

pub const AGGREGATE_ID: &str = "aggregateId";
pub const REVISION: &str = "revision";
pub const VERSION: &str = "version";
pub const CREATED_AT: &str = "createdAt";
pub const STATE: &str = "state";

pub type Item = HashMap<String, AttributeValue>;

/// Builds the primary key attributes for `key`.
pub fn key_attributes(key: &SnapshotKey) -> Item {
    HashMap::from([
        (
            AGGREGATE_ID.to_string(),
            AttributeValue::S(key.aggregate_id.clone()),
        ),
        (
            REVISION.to_string(),
            AttributeValue::N(key.revision.to_string()),
        ),
    ])
}

/// Encodes a snapshot as a full item.
pub fn to_item(snapshot: &Snapshot) -> Item {
    let mut item = key_attributes(&snapshot.key());
    item.insert(
        VERSION.to_string(),
        AttributeValue::N(snapshot.version.to_string()),
    );
    item.insert(
        CREATED_AT.to_string(),
        AttributeValue::N(snapshot.created_at.to_string()),
    );
    item.insert(
        STATE.to_string(),
        AttributeValue::S(snapshot.state.to_string()),
    );
    item
}

/// Decodes an item read back from the table.
pub fn from_item(item: &Item) -> Result<Snapshot, TableError> {
    let aggregate_id = string(item, AGGREGATE_ID)?.to_string();
    let state = serde_json::from_str(string(item, STATE)?)
        .map_err(|e| TableError::InvalidItem(format!("attribute {} is not JSON: {}", STATE, e)))?;

    Ok(Snapshot {
        aggregate_id,
        created_at: number(item, CREATED_AT)?,
        revision: number(item, REVISION)?,
        version: number(item, VERSION)?,
        state,
    })
}

fn required<'a>(item: &'a Item, name: &str) -> Result<&'a AttributeValue, TableError> {
    item.get(name)
        .ok_or_else(|| TableError::InvalidItem(format!("missing attribute {}", name)))
}

fn string<'a>(item: &'a Item, name: &str) -> Result<&'a str, TableError> {
    match required(item, name)? {
        AttributeValue::S(s) => Ok(s),
        other => Err(wrong_type(name, "S", other)),
    }
}

fn number<T: FromStr>(item: &Item, name: &str) -> Result<T, TableError> {
    match required(item, name)? {
        AttributeValue::N(n) => n
            .parse()
            .map_err(|_| TableError::InvalidItem(format!("attribute {} out of range: {}", name, n))),
        other => Err(wrong_type(name, "N", other)),
    }
}

fn wrong_type(name: &str, expected: &str, got: &AttributeValue) -> TableError {
    TableError::InvalidItem(format!(
        "attribute {} should be {}, got {:?}",
        name, expected, got
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn snapshot(state: Value) -> Snapshot {
        Snapshot {
            aggregate_id: "00000000-0000-0000-0000-000000000000".into(),
            created_at: 1_700_000_000_000,
            revision: 4,
            version: 1,
            state,
        }
    }

    #[test]
    fn test_item_layout() {
        let item = to_item(&snapshot(json!("one")));

        assert_eq!(item.len(), 5);
        assert_eq!(
            item[AGGREGATE_ID],
            AttributeValue::S("00000000-0000-0000-0000-000000000000".into())
        );
        assert_eq!(item[REVISION], AttributeValue::N("4".into()));
        assert_eq!(item[VERSION], AttributeValue::N("1".into()));
        assert_eq!(item[CREATED_AT], AttributeValue::N("1700000000000".into()));
        assert_eq!(item[STATE], AttributeValue::S(r#""one""#.into()));
    }

    #[test]
    fn test_key_attributes_only_hold_key() {
        let key = key_attributes(&SnapshotKey::new("order-1", 3));
        assert_eq!(key.len(), 2);
        assert!(!key.contains_key(STATE));
    }

    #[test]
    fn test_nested_state_survives() {
        let state = json!({
            "status": "paid",
            "lines": [{"sku": "a", "qty": 2}, {"sku": "b", "qty": -1}],
            "discount": 0.25,
            "note": null,
            "gift": false
        });
        let original = snapshot(state);

        let decoded = from_item(&to_item(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_integral_float_state_is_not_normalized() {
        let original = snapshot(json!({"price": 10.0, "qty": 10}));

        let item = to_item(&original);
        assert_eq!(
            item[STATE],
            AttributeValue::S(r#"{"price":10.0,"qty":10}"#.into())
        );

        let decoded = from_item(&item).unwrap();
        assert_eq!(decoded.state, json!({"price": 10.0, "qty": 10}));
        assert!(decoded.state["price"].is_f64());
        assert!(decoded.state["qty"].is_i64());
    }

    #[test]
    fn test_extreme_numbers_survive() {
        let original = snapshot(json!([u64::MAX, i64::MIN, 0.1, 1e300]));
        let decoded = from_item(&to_item(&original)).unwrap();
        assert_eq!(decoded.state, original.state);
    }

    #[test]
    fn test_missing_attribute() {
        let mut item = to_item(&snapshot(json!(1)));
        item.remove(STATE);

        let err = from_item(&item).unwrap_err();
        assert!(matches!(err, TableError::InvalidItem(ref m) if m.contains(STATE)));
    }

    #[test]
    fn test_state_must_be_json_text() {
        let mut item = to_item(&snapshot(json!(1)));
        item.insert(STATE.into(), AttributeValue::S("{not json".into()));
        assert!(matches!(from_item(&item), Err(TableError::InvalidItem(_))));

        item.insert(STATE.into(), AttributeValue::N("1".into()));
        assert!(matches!(from_item(&item), Err(TableError::InvalidItem(_))));
    }

    #[test]
    fn test_wrong_key_type() {
        let mut item = to_item(&snapshot(json!(1)));
        item.insert(REVISION.into(), AttributeValue::S("zero".into()));

        assert!(matches!(from_item(&item), Err(TableError::InvalidItem(_))));
    }

    #[test]
    fn test_negative_revision_rejected() {
        let mut item = to_item(&snapshot(json!(1)));
        item.insert(REVISION.into(), AttributeValue::N("-1".into()));

        assert!(matches!(from_item(&item), Err(TableError::InvalidItem(_))));
    }
}
