//! Entry envelope and tagging of inbound callback records
//!
//! Callback payloads have no fixed schema. Each record is kept as an open
//! key-value map and wrapped with two synthetic fields assigned at receipt:
//! `_entryId` and `_receivedAt`.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::time;

/// Key holding the synthetic entry identifier
pub const ENTRY_ID_KEY: &str = "_entryId";

/// Key holding the receipt timestamp
pub const RECEIVED_AT_KEY: &str = "_receivedAt";

/// Fallback timestamp key set by senders themselves
pub const TIMESTAMP_KEY: &str = "timestamp";

/// Key used to wrap payload elements that are not JSON objects
pub const SCALAR_VALUE_KEY: &str = "value";

const ID_PREFIX: &str = "entry";
const SUFFIX_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Last millisecond value handed out by [`next_id_millis`]
static LAST_ID_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Open record as stored and served by the webhook receiver
pub type Record = Map<String, Value>;

/// One tagged record held by the accumulator
///
/// Entries are immutable after tagging: there are accessors but no setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(flatten)]
    fields: Record,

    #[serde(rename = "_entryId")]
    entry_id: String,

    #[serde(rename = "_receivedAt", with = "time::serde_iso")]
    received_at: DateTime<Utc>,
}

impl Entry {
    fn tag(value: Value, received_at: DateTime<Utc>) -> Self {
        let fields = match value {
            Value::Object(map) => map
                .into_iter()
                .filter(|(key, _)| key != ENTRY_ID_KEY && key != RECEIVED_AT_KEY)
                .collect(),
            other => {
                let mut map = Record::new();
                map.insert(SCALAR_VALUE_KEY.to_string(), other);
                map
            }
        };

        Self {
            fields,
            entry_id: generate_entry_id(),
            received_at,
        }
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// Original fields without the synthetic envelope
    pub fn fields(&self) -> &Record {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Flatten into the wire representation (fields plus envelope keys)
    pub fn into_record(self) -> Record {
        let mut record = self.fields;
        record.insert(ENTRY_ID_KEY.to_string(), Value::String(self.entry_id));
        record.insert(
            RECEIVED_AT_KEY.to_string(),
            Value::String(time::to_iso(&self.received_at)),
        );
        record
    }
}

/// Tag an inbound payload, stamping every entry with the current time
///
/// Arrays yield one entry per element; any other value yields exactly one.
/// Never rejects input.
pub fn tag_payload(payload: Value) -> Vec<Entry> {
    tag_payload_at(payload, time::now())
}

/// Tag an inbound payload with an explicit receipt timestamp
pub fn tag_payload_at(payload: Value, received_at: DateTime<Utc>) -> Vec<Entry> {
    match payload {
        Value::Array(items) => items
            .into_iter()
            .map(|item| Entry::tag(item, received_at))
            .collect(),
        single => vec![Entry::tag(single, received_at)],
    }
}

/// Generate `entry-<millis>-<base36 suffix>`
///
/// The millis part never repeats within the process, so ids stay unique even
/// when several entries are tagged in the same millisecond.
pub fn generate_entry_id() -> String {
    let millis = next_id_millis(time::now().timestamp_millis());
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}-{}", ID_PREFIX, millis, suffix)
}

fn next_id_millis(now_ms: i64) -> i64 {
    let mut prev = LAST_ID_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = if now_ms > prev { now_ms } else { prev + 1 };
        match LAST_ID_MILLIS.compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}

/// Timestamp a record sorts by: `_receivedAt`, else `timestamp`
///
/// Records carrying neither (or unparseable values) return `None`, which
/// orders before any real timestamp.
pub fn sort_key(record: &Record) -> Option<DateTime<Utc>> {
    [RECEIVED_AT_KEY, TIMESTAMP_KEY]
        .iter()
        .filter_map(|key| record.get(*key).and_then(Value::as_str))
        .find_map(time::parse_iso)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_single_object_yields_one_entry() {
        let entries = tag_payload(json!({"name": "Jane", "company": "Acme"}));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].get("name"), Some(&json!("Jane")));
        assert_eq!(entries[0].get("company"), Some(&json!("Acme")));
        assert!(entries[0].entry_id().starts_with("entry-"));
    }

    #[test]
    fn test_array_yields_entry_per_element_with_distinct_ids() {
        let entries = tag_payload(json!([{"name": "A"}, {"name": "B"}, {"name": "C"}]));
        assert_eq!(entries.len(), 3);

        let ids: HashSet<_> = entries.iter().map(|e| e.entry_id().to_string()).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(entries[1].get("name"), Some(&json!("B")));
    }

    #[test]
    fn test_empty_object_and_empty_array() {
        let entries = tag_payload(json!({}));
        assert_eq!(entries.len(), 1);
        assert!(entries[0].fields().is_empty());

        assert!(tag_payload(json!([])).is_empty());
    }

    #[test]
    fn test_scalars_are_wrapped_not_rejected() {
        let entries = tag_payload(json!([1, "two", null, {"k": true}]));
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].get("value"), Some(&json!(1)));
        assert_eq!(entries[1].get("value"), Some(&json!("two")));
        assert_eq!(entries[2].get("value"), Some(&Value::Null));
        assert_eq!(entries[3].get("k"), Some(&json!(true)));
    }

    #[test]
    fn test_inbound_synthetic_keys_are_overridden() {
        let entries = tag_payload(json!({"_entryId": "spoofed", "_receivedAt": "1999", "x": 1}));
        let record = entries[0].clone().into_record();
        assert_ne!(record["_entryId"], json!("spoofed"));
        assert_ne!(record["_receivedAt"], json!("1999"));
        assert_eq!(record["x"], json!(1));
    }

    #[test]
    fn test_serialized_shape() {
        let at = Utc.with_ymd_and_hms(2025, 5, 14, 9, 30, 0).unwrap();
        let entry = tag_payload_at(json!({"name": "Jane"}), at).remove(0);
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["name"], "Jane");
        assert_eq!(value["_receivedAt"], "2025-05-14T09:30:00.000Z");
        assert_eq!(value["_entryId"], json!(entry.entry_id()));

        let back: Entry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_entry_id_format() {
        let id = generate_entry_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "entry");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 7);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_id_millis_strictly_increase_in_bursts() {
        let ids: Vec<i64> = (0..1000).map(|_| next_id_millis(5)).collect();
        assert!(ids.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_sort_key_prefers_received_at_then_timestamp() {
        let both = json!({"_receivedAt": "2025-01-02T00:00:00Z", "timestamp": "2020-01-01T00:00:00Z"});
        let only_ts = json!({"timestamp": "2020-01-01T00:00:00Z"});
        let neither = json!({"name": "x"});

        let key = |v: Value| sort_key(v.as_object().unwrap());
        assert_eq!(key(both), Some(Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap()));
        assert_eq!(key(only_ts), Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(key(neither), None);
    }
}
