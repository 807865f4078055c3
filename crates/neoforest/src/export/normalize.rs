//! Conversion of property values to portable JSON.
//!
//! Temporal values become ISO-8601 strings. Values JSON cannot carry natively (non-finite
//! floats, opaque store types) become their text form. Everything else passes through
//! unchanged, so normalization never fails.

use crate::graph::{PropertyMap, PropertyValue, Temporal};
use serde_json::{Map, Number, Value};

impl Temporal {
    /// ISO-8601 text of this value.
    ///
    /// Fractional seconds are printed only when present. Offsets are always numeric
    /// (`+00:00` rather than `Z`).
    pub fn to_iso8601(&self) -> String {
        match self {
            Temporal::Date(date) => date.format("%Y-%m-%d").to_string(),
            Temporal::LocalTime(time) => time.format("%H:%M:%S%.f").to_string(),
            Temporal::Time { time, offset } => {
                format!("{}{}", time.format("%H:%M:%S%.f"), offset)
            }
            Temporal::LocalDateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Temporal::DateTime(dt) => dt.to_rfc3339(),
        }
    }
}

impl std::fmt::Display for Temporal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Convert a property value to JSON.
pub fn normalize(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Null => Value::Null,
        PropertyValue::Bool(b) => Value::Bool(*b),
        PropertyValue::Int(i) => Value::from(*i),
        PropertyValue::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        PropertyValue::String(s) => Value::String(s.clone()),
        PropertyValue::Temporal(t) => Value::String(t.to_iso8601()),
        PropertyValue::List(items) => Value::Array(items.iter().map(normalize).collect()),
        PropertyValue::Map(map) => Value::Object(normalize_map(map)),
        PropertyValue::Other(text) => Value::String(text.clone()),
    }
}

/// Convert a property map to a JSON object, keeping key order.
pub fn normalize_map(props: &PropertyMap) -> Map<String, Value> {
    props
        .iter()
        .map(|(key, value)| (key.clone(), normalize(value)))
        .collect()
}
