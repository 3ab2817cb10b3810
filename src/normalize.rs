//! Normalization of loosely-typed snapshot records into [`PlaceRecord`]s.
//!
//! Malformed coordinates and sentiment scores degrade to sentinels, and bad
//! slots are dropped. Only a `popular_times` value that is neither empty nor a
//! mapping rejects the record, and even then the rest of the batch goes through.

use crate::engine::types::{HourSlot, PlaceRecord, SentimentLabel, Weekday};
use crate::error::RecordError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Result of normalizing one snapshot.
#[derive(Debug, Default)]
pub struct Normalized {
    pub records: Vec<PlaceRecord>,
    pub rejected: Vec<RecordError>,
}

/// Normalizes every raw record, collecting per-record rejections.
#[tracing::instrument(skip_all, fields(raw = raw.len()))]
pub fn normalize(raw: &[Value]) -> Normalized {
    let mut out = Normalized::default();

    for (index, value) in raw.iter().enumerate() {
        match normalize_record(index, value) {
            Ok(record) => out.records.push(record),
            Err(e) => {
                warn!(index, error = %e, "Record rejected");
                out.rejected.push(e);
            }
        }
    }

    debug!(
        accepted = out.records.len(),
        rejected = out.rejected.len(),
        "Snapshot normalized"
    );
    out
}

/// Normalizes a single raw record at position `index` of the snapshot.
///
/// Malformed slots and non-list day schedules are dropped with a warning; the
/// record itself is kept.
pub fn normalize_record(index: usize, value: &Value) -> Result<PlaceRecord, RecordError> {
    let obj = value
        .as_object()
        .ok_or(RecordError::NotAnObject { index })?;

    let name = coerce_name(obj.get("name"));
    if name.is_empty() {
        warn!(index, "Record has no name");
    }

    let (has_live_data, popular_times) =
        parse_popular_times(index, &name, obj.get("popular_times"))?;

    let sentiment_score = coerce_score(obj.get("sentiment_score"));
    let sentiment_label = SentimentLabel::from_score(sentiment_score);
    if !sentiment_label.is_mapped() {
        debug!(
            index,
            place = %name,
            score = ?obj.get("sentiment_score"),
            "Unmapped sentiment score"
        );
    }

    let latitude = coerce_coordinate(obj.get("latitude"));
    let longitude = coerce_coordinate(obj.get("longitude"));
    if latitude.is_none() || longitude.is_none() {
        debug!(index, place = %name, "Missing or malformed coordinates");
    }

    Ok(PlaceRecord {
        name,
        latitude,
        longitude,
        sentiment_score,
        sentiment_label,
        has_live_data,
        popular_times,
        summary: obj.get("summary").and_then(Value::as_str).map(str::to_string),
        topics: coerce_topics(obj.get("topics")),
        timestamp: obj.get("timestamp").and_then(Value::as_str).map(str::to_string),
    })
}

fn coerce_name(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Numbers and numeric strings become coordinates; anything else is `None`.
pub fn coerce_coordinate(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Integer-valued numbers only; `2.0` counts as `2`.
pub fn coerce_score(value: Option<&Value>) -> Option<i64> {
    let Value::Number(n) = value? else {
        return None;
    };
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    n.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

fn coerce_topics(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|t| t.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` all mean "no live data".
fn is_empty_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

type Schedule = BTreeMap<Weekday, Vec<HourSlot>>;

fn parse_popular_times(
    index: usize,
    name: &str,
    value: Option<&Value>,
) -> Result<(bool, Schedule), RecordError> {
    let value = match value {
        Some(v) if !is_empty_falsy(v) => v,
        _ => return Ok((false, Schedule::new())),
    };

    let days = value
        .as_object()
        .ok_or_else(|| RecordError::PopularTimesShape {
            index,
            name: name.to_string(),
            found: type_name(value),
        })?;

    Ok((true, parse_days(index, name, days)))
}

fn parse_days(index: usize, name: &str, days: &Map<String, Value>) -> Schedule {
    let mut schedule = Schedule::new();

    for (key, slots) in days {
        let Some(day) = Weekday::from_key(key) else {
            warn!(index, place = name, key = %key, "Ignoring unknown weekday key");
            continue;
        };

        let slots = match slots {
            Value::Null => continue,
            Value::Array(items) => items,
            other => {
                warn!(
                    index,
                    place = name,
                    day = %day,
                    found = type_name(other),
                    "Schedule is not a list, treating day as empty"
                );
                continue;
            }
        };

        let mut parsed = Vec::with_capacity(slots.len());
        for (position, slot) in slots.iter().enumerate() {
            match parse_slot(index, name, slot) {
                Ok(slot) => parsed.push(slot),
                Err(reason) => {
                    warn!(
                        index,
                        place = name,
                        day = %day,
                        position,
                        reason = %reason,
                        "Dropping slot"
                    );
                }
            }
        }
        schedule.insert(day, parsed);
    }

    schedule
}

/// Integer-valued numbers only; `9.0` counts as `9`.
fn coerce_hour(value: Option<&Value>) -> Option<u8> {
    let Value::Number(n) = value? else {
        return None;
    };
    let hour = match n.as_u64() {
        Some(h) => h,
        None => n
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && *f >= 0.0)
            .map(|f| f as u64)?,
    };
    (hour <= 23).then_some(hour as u8)
}

/// Clamps into 0-100 and rounds. Anything above 0 stays at least 1, so a
/// measured slot never reads as closed.
fn coerce_percentage(raw: f64) -> u8 {
    let clamped = raw.clamp(0.0, 100.0);
    if clamped > 0.0 && clamped < 1.0 {
        1
    } else {
        clamped.round() as u8
    }
}

fn parse_slot(index: usize, name: &str, slot: &Value) -> Result<HourSlot, String> {
    let obj = slot
        .as_object()
        .ok_or_else(|| format!("expected an object, found {}", type_name(slot)))?;

    let hour = coerce_hour(obj.get("hour"))
        .ok_or_else(|| format!("hour {:?} is not an integer in 0-23", obj.get("hour")))?;

    let raw_pct = obj
        .get("percentage")
        .and_then(Value::as_f64)
        .filter(|p| p.is_finite())
        .ok_or_else(|| format!("percentage {:?} is not a number", obj.get("percentage")))?;

    let percentage = coerce_percentage(raw_pct);
    if f64::from(percentage) != raw_pct {
        debug!(index, place = name, hour, raw_pct, percentage, "Adjusted percentage");
    }

    Ok(HourSlot { hour, percentage })
}
