//! Indexed record base shared by every configuration section.

use crate::value::Value;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Decimal position of a section within its namespace.
///
/// Indices have no upper bound. They are kept as canonical digits, without
/// leading zeros, so `ethernet007` and `ethernet7` name the same section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionIndex(String);

impl SectionIndex {
    pub fn new(number: u64) -> Self {
        Self(number.to_string())
    }

    /// Parse a run of ASCII digits. `None` when empty or not all digits.
    pub fn from_digits(digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let canonical = match digits.trim_start_matches('0') {
            "" => "0",
            rest => rest,
        };
        Some(Self(canonical.to_string()))
    }

    /// The index as a number, when it fits in `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SectionIndex {
    fn default() -> Self {
        Self::new(0)
    }
}

impl From<u64> for SectionIndex {
    fn from(number: u64) -> Self {
        Self::new(number)
    }
}

impl Ord for SectionIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for SectionIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SectionIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Numbers when they fit in `u64`, digit strings beyond that.
impl Serialize for SectionIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_u64() {
            Some(number) => serializer.serialize_u64(number),
            None => serializer.serialize_str(&self.0),
        }
    }
}

/// An ordered bag of attributes identified by its position in a collection.
///
/// Attributes keep the order they were first assigned in; assigning an
/// existing name again replaces the value in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    index: SectionIndex,
    attributes: IndexMap<String, Value>,
}

impl ConfigEntry {
    pub fn new(index: SectionIndex) -> Self {
        Self {
            index,
            attributes: IndexMap::new(),
        }
    }

    pub fn index(&self) -> &SectionIndex {
        &self.index
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_integer)
    }

    /// Boolean attribute, `false` when never assigned.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
