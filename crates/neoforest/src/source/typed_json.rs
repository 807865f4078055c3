//! Decoder for Neo4j typed JSON.
//!
//! The Query API can answer in a typed form where every value is wrapped as
//! `{"$type": "<Type>", "_value": <payload>}`. Keeping the wrapper is what lets temporal
//! values survive the transport with their native type. Plain JSON values without a
//! wrapper are accepted as well and decoded by their JSON shape.

use crate::error::{ExportError, Result};
use crate::graph::{NodeId, PropertyMap, PropertyValue, Temporal};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use std::borrow::Cow;

const TYPE_KEY: &str = "$type";
const VALUE_KEY: &str = "_value";

/// Decode one (possibly typed) JSON value into a property value.
///
/// # Errors
///
/// Returns [`ExportError::Decode`] if a typed wrapper's payload does not match its type
/// (for example an `Integer` whose payload is not a number).
pub fn decode_value(value: &Value) -> Result<PropertyValue> {
    match split_typed(value) {
        Some((kind, payload)) => decode_typed(kind, payload),
        None => decode_plain(value),
    }
}

/// Decode a value that must be an integer id.
pub fn decode_id(value: &Value) -> Result<NodeId> {
    match decode_value(value)? {
        PropertyValue::Int(id) => Ok(id),
        other => Err(ExportError::decode(format!(
            "expected an integer id, got {}",
            other.kind()
        ))),
    }
}

/// Decode a value that must be a string.
pub fn decode_string(value: &Value) -> Result<String> {
    match decode_value(value)? {
        PropertyValue::String(s) => Ok(s),
        other => Err(ExportError::decode(format!(
            "expected a string, got {}",
            other.kind()
        ))),
    }
}

/// Decode a property set; a null property set decodes to an empty map.
pub fn decode_properties(value: &Value) -> Result<PropertyMap> {
    match decode_value(value)? {
        PropertyValue::Map(map) => Ok(map),
        PropertyValue::Null => Ok(PropertyMap::new()),
        other => Err(ExportError::decode(format!(
            "expected a property map, got {}",
            other.kind()
        ))),
    }
}

fn split_typed(value: &Value) -> Option<(&str, &Value)> {
    let obj = value.as_object()?;
    let kind = obj.get(TYPE_KEY)?.as_str()?;
    let payload = obj.get(VALUE_KEY).unwrap_or(&Value::Null);
    Some((kind, payload))
}

fn decode_typed(kind: &str, payload: &Value) -> Result<PropertyValue> {
    let value = match kind {
        "Null" => PropertyValue::Null,
        "Boolean" => PropertyValue::Bool(payload.as_bool().ok_or_else(|| mismatch(kind, payload))?),
        "Integer" => PropertyValue::Int(parse_int(payload).ok_or_else(|| mismatch(kind, payload))?),
        "Float" => PropertyValue::Float(parse_float(payload).ok_or_else(|| mismatch(kind, payload))?),
        "String" => PropertyValue::String(
            payload
                .as_str()
                .ok_or_else(|| mismatch(kind, payload))?
                .to_string(),
        ),
        "List" => {
            let items = payload.as_array().ok_or_else(|| mismatch(kind, payload))?;
            PropertyValue::List(items.iter().map(decode_value).collect::<Result<_>>()?)
        }
        "Map" => {
            let obj = payload.as_object().ok_or_else(|| mismatch(kind, payload))?;
            let mut map = PropertyMap::new();
            for (key, item) in obj {
                map.insert(key.clone(), decode_value(item)?);
            }
            PropertyValue::Map(map)
        }
        "Date" | "Time" | "LocalTime" | "DateTime" | "OffsetDateTime" | "ZonedDateTime"
        | "LocalDateTime" => {
            let text = payload.as_str().ok_or_else(|| mismatch(kind, payload))?;
            match parse_temporal(kind, text) {
                Some(t) => PropertyValue::Temporal(t),
                None => PropertyValue::Other(text.to_string()),
            }
        }
        // Duration, Point, Base64, graph entities and anything newer: keep the text.
        _ => PropertyValue::Other(match payload {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
    };
    Ok(value)
}

fn decode_plain(value: &Value) -> Result<PropertyValue> {
    Ok(match value {
        Value::Null => PropertyValue::Null,
        Value::Bool(b) => PropertyValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => PropertyValue::Int(i),
            None => PropertyValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => PropertyValue::String(s.clone()),
        Value::Array(items) => {
            PropertyValue::List(items.iter().map(decode_value).collect::<Result<_>>()?)
        }
        Value::Object(obj) => {
            let mut map = PropertyMap::new();
            for (key, item) in obj {
                map.insert(key.clone(), decode_value(item)?);
            }
            PropertyValue::Map(map)
        }
    })
}

fn mismatch(kind: &str, payload: &Value) -> ExportError {
    ExportError::decode(format!("invalid {kind} payload: {payload}"))
}

fn parse_int(payload: &Value) -> Option<i64> {
    match payload {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

fn parse_float(payload: &Value) -> Option<f64> {
    match payload {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Parse the ISO text of a typed temporal value.
///
/// Returns `None` when the text is not in a recognised form.
pub fn parse_temporal(kind: &str, text: &str) -> Option<Temporal> {
    match kind {
        "Date" => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .map(Temporal::Date),
        "LocalTime" => parse_time(&with_seconds(text, 0)).map(Temporal::LocalTime),
        "Time" => {
            // Borrow the RFC 3339 parser for the time-with-offset form.
            let dt = DateTime::parse_from_rfc3339(&format!("1970-01-01T{}", with_seconds(text, 0))).ok()?;
            Some(Temporal::Time {
                time: dt.time(),
                offset: *dt.offset(),
            })
        }
        "LocalDateTime" => {
            let text = with_seconds(text, 11);
            NaiveDateTime::parse_from_str(&text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(Temporal::LocalDateTime)
        }
        "DateTime" | "OffsetDateTime" | "ZonedDateTime" => {
            let without_zone = text.split('[').next().unwrap_or(text);
            DateTime::parse_from_rfc3339(&with_seconds(without_zone, 11))
                .ok()
                .map(Temporal::DateTime)
        }
        _ => None,
    }
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f").ok()
}

/// ISO-8601 allows `HH:MM` with the seconds omitted; chrono's parsers need them.
fn with_seconds(text: &str, time_start: usize) -> Cow<'_, str> {
    let minutes_end = time_start + 5;
    match text.as_bytes().get(minutes_end) {
        Some(b':') => Cow::Borrowed(text),
        _ if text.len() >= minutes_end && text.is_char_boundary(minutes_end) => {
            let mut padded = String::with_capacity(text.len() + 3);
            padded.push_str(&text[..minutes_end]);
            padded.push_str(":00");
            padded.push_str(&text[minutes_end..]);
            Cow::Owned(padded)
        }
        _ => Cow::Borrowed(text),
    }
}
