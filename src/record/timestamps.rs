use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::database::models::entity::{CREATED_AT, UPDATED_AT};
use crate::database::store::Row;

fn stamp(now: DateTime<Utc>) -> Value {
    Value::String(now.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// New map with `created_at` and `updated_at` set from one clock read
pub fn add_create_timestamps(record: &Row) -> Row {
    add_create_timestamps_at(record, Utc::now())
}

/// New map with `updated_at` set to now
pub fn add_update_timestamps(record: &Row) -> Row {
    add_update_timestamps_at(record, Utc::now())
}

pub fn add_create_timestamps_at(record: &Row, now: DateTime<Utc>) -> Row {
    let mut out = record.clone();
    let ts = stamp(now);
    out.insert(CREATED_AT.to_string(), ts.clone());
    out.insert(UPDATED_AT.to_string(), ts);
    out
}

pub fn add_update_timestamps_at(record: &Row, now: DateTime<Utc>) -> Row {
    let mut out = record.clone();
    out.insert(UPDATED_AT.to_string(), stamp(now));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn create_sets_both_from_one_instant() {
        let mut row = Row::new();
        row.insert("name".into(), json!("Widget"));
        let out = add_create_timestamps(&row);
        assert_eq!(out[CREATED_AT], out[UPDATED_AT]);
        assert_eq!(out["name"], "Widget");
        assert!(!row.contains_key(CREATED_AT));
    }

    #[test]
    fn update_only_touches_updated_at() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let mut row = Row::new();
        row.insert(CREATED_AT.into(), json!("2020-01-01T00:00:00.000000Z"));
        let out = add_update_timestamps_at(&row, now);
        assert_eq!(out[CREATED_AT], "2020-01-01T00:00:00.000000Z");
        assert_eq!(out[UPDATED_AT], "2024-05-01T10:00:00.000000Z");
    }

    #[test]
    fn injected_clock_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let out = add_create_timestamps_at(&Row::new(), now);
        assert_eq!(out[CREATED_AT], json!("2023-12-31T23:59:59.000000Z"));
    }
}
