//! Property system for schema-less node and edge metadata.
//!
//! Property maps keep the order in which the data source returned their keys so that the
//! exported document is stable across runs.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;

/// A date/time value native to the graph store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    /// Calendar date without time or zone
    Date(NaiveDate),
    /// Time of day with a UTC offset
    Time {
        /// Wall-clock time
        time: NaiveTime,
        /// Offset from UTC
        offset: FixedOffset,
    },
    /// Time of day without zone
    LocalTime(NaiveTime),
    /// Instant with a UTC offset (named zones are resolved to their offset)
    DateTime(DateTime<FixedOffset>),
    /// Date and time without zone
    LocalDateTime(NaiveDateTime),
}

/// Dynamically typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Explicit null/absence of value
    Null,
    /// Boolean flag
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Graph-native date/time value
    Temporal(Temporal),
    /// Ordered sequence of values
    List(Vec<PropertyValue>),
    /// Nested mapping
    Map(PropertyMap),
    /// Value with no native representation, kept as its textual form
    Other(String),
}

impl PropertyValue {
    /// Short name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Null => "null",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::String(_) => "string",
            PropertyValue::Temporal(_) => "temporal",
            PropertyValue::List(_) => "list",
            PropertyValue::Map(_) => "map",
            PropertyValue::Other(_) => "other",
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<Temporal> for PropertyValue {
    fn from(value: Temporal) -> Self {
        PropertyValue::Temporal(value)
    }
}

impl From<NaiveDate> for PropertyValue {
    fn from(value: NaiveDate) -> Self {
        PropertyValue::Temporal(Temporal::Date(value))
    }
}

impl From<NaiveDateTime> for PropertyValue {
    fn from(value: NaiveDateTime) -> Self {
        PropertyValue::Temporal(Temporal::LocalDateTime(value))
    }
}

impl From<DateTime<FixedOffset>> for PropertyValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        PropertyValue::Temporal(Temporal::DateTime(value))
    }
}

impl From<PropertyMap> for PropertyValue {
    fn from(value: PropertyMap) -> Self {
        PropertyValue::Map(value)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(value: Vec<T>) -> Self {
        PropertyValue::List(value.into_iter().map(Into::into).collect())
    }
}

/// Ordered key-value metadata for nodes and edges.
///
/// Keys are unique; re-inserting a key replaces its value in place and keeps its position.
/// Two maps are equal only if they hold the same entries in the same order.
#[derive(Debug, Clone, Default)]
pub struct PropertyMap {
    entries: IndexMap<String, PropertyValue>,
}

impl PropertyMap {
    /// Create a new empty property map.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Builder pattern: add a property and return self.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a property value, returning the previous value for the key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Get a property value by key.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    /// Remove a property by key, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.entries.shift_remove(key)
    }

    /// Check if a property exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Get the number of properties.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the property map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all properties in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.entries.iter()
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Type-safe getter for string properties.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(PropertyValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Type-safe getter for integer properties.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(PropertyValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Type-safe getter for float properties.
    pub fn get_float(&self, key: &str) -> Option<f64> {
        match self.get(key) {
            Some(PropertyValue::Float(f)) => Some(*f),
            _ => None,
        }
    }

    /// Type-safe getter for boolean properties.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(PropertyValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Type-safe getter for temporal properties.
    pub fn get_temporal(&self, key: &str) -> Option<&Temporal> {
        match self.get(key) {
            Some(PropertyValue::Temporal(t)) => Some(t),
            _ => None,
        }
    }

    /// Type-safe getter for list properties.
    pub fn get_list(&self, key: &str) -> Option<&[PropertyValue]> {
        match self.get(key) {
            Some(PropertyValue::List(list)) => Some(list),
            _ => None,
        }
    }

    /// Type-safe getter for nested map properties.
    pub fn get_map(&self, key: &str) -> Option<&PropertyMap> {
        match self.get(key) {
            Some(PropertyValue::Map(map)) => Some(map),
            _ => None,
        }
    }
}

impl PartialEq for PropertyMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl FromIterator<(String, PropertyValue)> for PropertyMap {
    fn from_iter<T: IntoIterator<Item = (String, PropertyValue)>>(iter: T) -> Self {
        let mut map = PropertyMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for PropertyMap {
    type Item = (String, PropertyValue);
    type IntoIter = indexmap::map::IntoIter<String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
