//! Read-repair for persisted lists.
//!
//! Storage has been seen to hand back arrays as object maps keyed by index,
//! and older records can lack timestamps. The functions here turn whatever
//! was read into well-formed records and report whether the corrected form
//! should be written back. They never touch the store; the repositories
//! issue the write-back.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::models::{Collection, HistoryItem};

const HISTORY_DATE_FIELD: &str = "timestamp";
const COLLECTION_DATE_FIELD: &str = "createdAt";

/// Result of normalizing one stored list.
#[derive(Debug, Clone, PartialEq)]
pub struct Repaired<T> {
    pub records: Vec<T>,
    pub needs_write_back: bool,
}

pub fn normalize_history(raw: Option<Value>, now: DateTime<Utc>) -> Repaired<HistoryItem> {
    let (values, reshaped) = match raw {
        Some(Value::Array(values)) => (values, false),
        Some(Value::Object(map)) => match migrate_index_map(map) {
            Some(values) => {
                tracing::warn!(
                    "History was stored as an object map; migrating {} entries back to a list",
                    values.len()
                );
                (values, true)
            }
            None => {
                tracing::warn!("History was stored as an object map with invalid entries; resetting");
                (Vec::new(), true)
            }
        },
        None => {
            tracing::debug!("No history stored yet");
            (Vec::new(), true)
        }
        Some(other) => {
            tracing::warn!("History has unexpected shape ({}); resetting", shape_name(&other));
            (Vec::new(), true)
        }
    };

    let (records, repaired) = decode_records(values, HISTORY_DATE_FIELD, "history item", now);
    Repaired {
        records,
        needs_write_back: reshaped || repaired,
    }
}

pub fn normalize_collections(raw: Option<Value>, now: DateTime<Utc>) -> Repaired<Collection> {
    let (values, reshaped) = match raw {
        Some(Value::Array(values)) => (values, false),
        None => {
            tracing::debug!("No collections stored yet");
            (Vec::new(), true)
        }
        Some(other) => {
            tracing::warn!("Collections have unexpected shape ({}); resetting", shape_name(&other));
            (Vec::new(), true)
        }
    };

    let (mut records, mut repaired) =
        decode_records::<Collection>(values, COLLECTION_DATE_FIELD, "collection", now);
    records.retain(|c| {
        let named = !c.name.trim().is_empty();
        if !named {
            tracing::warn!("Dropping collection {} with a blank name", c.id);
            repaired = true;
        }
        named
    });
    Repaired {
        records,
        needs_write_back: reshaped || repaired,
    }
}

/// Recover a list that was serialized as `{"0": {...}, "1": {...}}`.
///
/// Only accepted when every value is a record with an `id`; anything else
/// returns `None`.
fn migrate_index_map(map: Map<String, Value>) -> Option<Vec<Value>> {
    let all_records = map
        .values()
        .all(|v| v.as_object().is_some_and(|o| o.contains_key("id")));
    if !all_records {
        return None;
    }

    let mut entries: Vec<(String, Value)> = map.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    Some(entries.into_iter().map(|(_, v)| v).collect())
}

/// Decode each element, repairing its date field. Returns the records and
/// whether anything had to be fixed or dropped.
fn decode_records<T: DeserializeOwned>(
    values: Vec<Value>,
    date_field: &str,
    kind: &str,
    now: DateTime<Utc>,
) -> (Vec<T>, bool) {
    let mut repaired = false;
    let mut records = Vec::with_capacity(values.len());

    for value in values {
        let mut obj = match value {
            Value::Object(obj) => obj,
            other => {
                tracing::warn!("Dropping {} that is not a record ({})", kind, shape_name(&other));
                repaired = true;
                continue;
            }
        };

        let date = match obj.get(date_field).and_then(coerce_datetime) {
            Some(date) => date,
            None => {
                tracing::warn!(
                    "{} {} has no usable {}; using current time",
                    kind,
                    record_id(&obj),
                    date_field
                );
                repaired = true;
                now
            }
        };
        obj.insert(date_field.to_string(), Value::String(date.to_rfc3339()));

        let id = record_id(&obj);
        match serde_json::from_value::<T>(Value::Object(obj)) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Dropping malformed {} {}: {}", kind, id, e);
                repaired = true;
            }
        }
    }

    (records, repaired)
}

/// Accepts RFC 3339 strings, SQLite-style datetimes, and epoch milliseconds.
/// Missing values and `{}` placeholders yield `None`.
fn coerce_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_datetime(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

fn record_id(obj: &Map<String, Value>) -> String {
    match obj.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => "<no id>".to_string(),
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn item(id: &str, ts: &str) -> Value {
        json!({
            "id": id,
            "url": format!("https://example.com/{}", id),
            "title": id,
            "summary": "s",
            "timestamp": ts,
            "settings": { "length": "medium", "type": "key_points", "language": "English" }
        })
    }

    fn ids(items: &[HistoryItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn well_formed_list_is_left_alone() {
        let raw = json!([item("a", "2024-01-02T00:00:00Z"), item("b", "2024-01-01T00:00:00Z")]);
        let repaired = normalize_history(Some(raw), now());
        assert_eq!(ids(&repaired.records), vec!["a", "b"]);
        assert!(!repaired.needs_write_back);
    }

    #[test]
    fn index_map_of_records_is_migrated_in_index_order() {
        let raw = json!({
            "10": item("k", "2024-01-01T00:00:00Z"),
            "2": item("c", "2024-01-03T00:00:00Z"),
            "0": item("a", "2024-01-05T00:00:00Z"),
        });
        let repaired = normalize_history(Some(raw), now());
        assert_eq!(ids(&repaired.records), vec!["a", "c", "k"]);
        assert!(repaired.needs_write_back);
    }

    #[test]
    fn index_map_with_a_non_record_is_discarded() {
        let raw = json!({
            "0": item("a", "2024-01-05T00:00:00Z"),
            "1": { "title": "no id here" },
        });
        let repaired = normalize_history(Some(raw), now());
        assert!(repaired.records.is_empty());
        assert!(repaired.needs_write_back);

        let raw = json!({ "0": item("a", "2024-01-05T00:00:00Z"), "1": 42 });
        let repaired = normalize_history(Some(raw), now());
        assert!(repaired.records.is_empty());
        assert!(repaired.needs_write_back);
    }

    #[test]
    fn null_missing_and_primitives_reset_history() {
        for raw in [None, Some(Value::Null), Some(json!(7)), Some(json!("text")), Some(json!(true))] {
            let repaired = normalize_history(raw, now());
            assert!(repaired.records.is_empty());
            assert!(repaired.needs_write_back);
        }
    }

    #[test]
    fn missing_or_placeholder_timestamp_becomes_now() {
        let mut missing = item("a", "");
        missing.as_object_mut().unwrap().remove("timestamp");
        let mut placeholder = item("b", "");
        placeholder["timestamp"] = json!({});

        let repaired = normalize_history(Some(json!([missing, placeholder])), now());
        assert_eq!(repaired.records.len(), 2);
        assert!(repaired.records.iter().all(|i| i.timestamp == now()));
        assert!(repaired.needs_write_back);
    }

    #[test]
    fn epoch_millis_and_sqlite_dates_are_coerced() {
        let mut numeric = item("a", "");
        numeric["timestamp"] = json!(1_700_000_000_000i64);
        let sqlite = item("b", "2024-03-04 05:06:07");

        let repaired = normalize_history(Some(json!([numeric, sqlite])), now());
        assert_eq!(
            repaired.records[0].timestamp,
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
        );
        assert_eq!(
            repaired.records[1].timestamp,
            Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap()
        );
        assert!(!repaired.needs_write_back);
    }

    #[test]
    fn undecodable_elements_are_dropped() {
        let raw = json!([item("a", "2024-01-01T00:00:00Z"), "junk", { "title": "no id" }]);
        let repaired = normalize_history(Some(raw), now());
        assert_eq!(ids(&repaired.records), vec!["a"]);
        assert!(repaired.needs_write_back);
    }

    #[test]
    fn sparse_records_decode_with_defaults() {
        let raw = json!([{ "id": "a", "timestamp": "2024-01-01T00:00:00Z" }]);
        let repaired = normalize_history(Some(raw), now());
        let record = &repaired.records[0];
        assert_eq!(record.url, "");
        assert_eq!(record.collection_id, None);
        assert_eq!(record.settings.language, "English");
    }

    #[test]
    fn empty_map_resets_collections() {
        let repaired = normalize_collections(Some(json!({})), now());
        assert!(repaired.records.is_empty());
        assert!(repaired.needs_write_back);
    }

    #[test]
    fn collections_never_migrate_object_maps() {
        let raw = json!({ "0": { "id": "coll_1", "name": "Work", "createdAt": "2024-01-01T00:00:00Z" } });
        let repaired = normalize_collections(Some(raw), now());
        assert!(repaired.records.is_empty());
        assert!(repaired.needs_write_back);
    }

    #[test]
    fn collection_created_at_is_repaired() {
        let raw = json!([
            { "id": "coll_1", "name": "Work", "createdAt": {} },
            { "id": "coll_2", "name": "Home", "createdAt": "2024-01-01T00:00:00Z" },
        ]);
        let repaired = normalize_collections(Some(raw), now());
        assert_eq!(repaired.records.len(), 2);
        assert_eq!(repaired.records[0].created_at, now());
        assert_eq!(repaired.records[1].name, "Home");
        assert!(repaired.needs_write_back);
    }

    #[test]
    fn unnamed_collections_are_dropped() {
        let raw = json!([
            { "id": "coll_1", "createdAt": "2024-01-01T00:00:00Z" },
            { "id": "coll_2", "name": "  ", "createdAt": "2024-01-01T00:00:00Z" },
            { "id": "coll_3", "name": "Work", "createdAt": "2024-01-01T00:00:00Z" },
        ]);
        let repaired = normalize_collections(Some(raw), now());
        let ids: Vec<_> = repaired.records.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["coll_3"]);
        assert!(repaired.needs_write_back);
    }
}
