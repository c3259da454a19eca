//! Single-entry key/value pairs.
//!
//! Templates pass `Parameters`, `Tags` and `ParameterOverrides` as lists of
//! one-key objects:
//!
//! ```json
//! [{"Environment": "prod"}, {"CostCenter": "1234"}]
//! ```
//!
//! Each object must hold exactly one entry.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One `{"Key": "Value"}` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyValue {
    /// The entry key.
    pub key: String,
    /// The entry value, always rendered as a string.
    pub value: String,
}

impl KeyValue {
    /// Create a new pair.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Serialize for KeyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.value)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for KeyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(KeyValueVisitor)
    }
}

struct KeyValueVisitor;

impl<'de> Visitor<'de> for KeyValueVisitor {
    type Value = KeyValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with exactly one key")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<KeyValue, A::Error> {
        let Some((key, value)) = map.next_entry::<String, serde_json::Value>()? else {
            return Err(de::Error::custom("expected one key/value entry, found none"));
        };
        if let Some(extra) = map.next_key::<String>()? {
            return Err(de::Error::custom(format!(
                "expected one key/value entry, found extra key {extra:?} after {key:?}"
            )));
        }
        let value = scalar_to_string(value)
            .ok_or_else(|| de::Error::custom(format!("value for {key:?} must be a scalar")))?;
        Ok(KeyValue { key, value })
    }
}

/// Render a JSON scalar the way CloudFormation would pass it: as a string.
#[must_use]
pub fn scalar_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
