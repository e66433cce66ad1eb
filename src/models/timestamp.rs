//! Lenient decoding for remote timestamps.
//!
//! The admin API serializes Firestore timestamps inconsistently: RFC 3339
//! strings, `{_seconds, _nanoseconds}` objects, epoch numbers, and sometimes
//! `null` or a sentinel object that is none of these. Every timestamp field
//! decodes through here so one bad value never fails a whole page.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Format the API expects for task deadlines
pub const DEADLINE_FORMAT: &str = "%d/%m/%Y %H:%M";

// Epoch values above this are milliseconds
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_str(s),
        Value::Number(n) => {
            let raw = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            if raw.abs() >= MILLIS_THRESHOLD {
                Utc.timestamp_millis_opt(raw).single()
            } else {
                Utc.timestamp_opt(raw, 0).single()
            }
        }
        Value::Object(map) => {
            let seconds = map
                .get("_seconds")
                .or_else(|| map.get("seconds"))
                .and_then(Value::as_i64)?;
            let nanos = map
                .get("_nanoseconds")
                .or_else(|| map.get("nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            Utc.timestamp_opt(seconds, u32::try_from(nanos).ok()?).single()
        }
        _ => None,
    }
}

fn parse_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, DEADLINE_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse operator input: `DD/MM/YYYY HH:MM` or RFC 3339
pub fn parse_deadline(input: &str) -> Option<DateTime<Utc>> {
    parse_str(input)
}

/// Render a deadline the way the task endpoints accept it
pub fn format_deadline(deadline: &DateTime<Utc>) -> String {
    deadline.format(DEADLINE_FORMAT).to_string()
}

/// `#[serde(with = "lenient")]` for `Option<DateTime<Utc>>` fields
pub mod lenient {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(parse_timestamp))
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }
}
