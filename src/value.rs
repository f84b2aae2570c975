//! The configuration value model.
//!
//! A [`Value`] is one of a closed set of shapes: a scalar (string, integer,
//! float, boolean), an ordered [`Array`](Value::Array), a string-keyed
//! [`Table`], or an opaque [`Callable`]. Tables keep insertion order so a
//! merged result lists keys the way its inputs did.
//!
//! Values can be built by hand, parsed from TOML text with
//! [`table_from_toml`], or converted from any self-describing serde format
//! (`serde_json::Value`, `toml::Value`, ...) through the `Deserialize` impl.
//! `null` entries inside maps and arrays are dropped during conversion: a key
//! set to `null` is treated as absent.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, Serialize, Serializer};

use crate::error::{BoxError, MergeError};

/// String-keyed, insertion-ordered mapping of configuration values.
pub type Table = IndexMap<String, Value>;

type CallableFn = dyn Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync;

/// An opaque function carried inside a configuration.
///
/// Callables are never merged or inspected. When both sides of a merge hold
/// one, the incoming side wins like any other scalar. Cloning shares the
/// underlying function; two callables are equal only if they are the same
/// function handle.
#[derive(Clone)]
pub struct Callable(Arc<CallableFn>);

impl Callable {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Callable(Arc::new(f))
    }

    /// Invoke the wrapped function.
    pub fn call(&self, args: &[Value]) -> Result<Value, BoxError> {
        (self.0)(args)
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

/// A dynamically-typed configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<Value>),
    Table(Table),
    Callable(Callable),
}

impl Value {
    /// Short name of the variant, used in error messages and logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Array(_) => "array",
            Value::Table(_) => "table",
            Value::Callable(_) => "callable",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(c) => Some(c),
            _ => None,
        }
    }

    /// Unwrap a table, or report what was found instead.
    pub fn into_table(self) -> Result<Table, MergeError> {
        match self {
            Value::Table(table) => Ok(table),
            other => Err(MergeError::NotATable {
                found: other.type_name(),
            }),
        }
    }

    /// Convert any JSON value. `null` object entries are dropped; a bare
    /// `null` is rejected.
    pub fn from_json(json: serde_json::Value) -> Result<Value, MergeError> {
        Ok(Value::deserialize(json)?)
    }

    /// Serialize to JSON. Fails if the value contains a callable.
    pub fn to_json(&self) -> Result<serde_json::Value, MergeError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Parse TOML text into a table.
pub fn table_from_toml(source: &str) -> Result<Table, MergeError> {
    let value: Value = toml::from_str(source)?;
    value.into_table()
}

/// Convert a JSON object into a table.
pub fn table_from_json(json: serde_json::Value) -> Result<Table, MergeError> {
    Value::from_json(json)?.into_table()
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<Table> for Value {
    fn from(table: Table) -> Self {
        Value::Table(table)
    }
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Value::Callable(c)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Array(items) => items.serialize(serializer),
            Value::Table(table) => table.serialize(serializer),
            Value::Callable(_) => Err(ser::Error::custom("callables cannot be serialized")),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Entry::deserialize(deserializer)?
            .0
            .ok_or_else(|| de::Error::custom("null is not a configuration value"))
    }
}

/// Marker key under which `toml` hands out datetimes as a one-entry map.
const TOML_DATETIME_KEY: &str = "$__toml_private_datetime";

/// A possibly-null value. Everything goes through `deserialize_any`, so
/// formats that only describe themselves there (toml datetimes) still work.
struct Entry(Option<Value>);

impl<'de> Deserialize<'de> for Entry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EntryVisitor).map(Entry)
    }
}

struct EntryVisitor;

impl<'de> Visitor<'de> for EntryVisitor {
    type Value = Option<Value>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a configuration value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Some(Value::Boolean(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(Value::Integer(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        // Above i64::MAX the value degrades to the nearest float.
        Ok(Some(
            i64::try_from(v)
                .map(Value::Integer)
                .unwrap_or(Value::Float(v as f64)),
        ))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Some(Value::Float(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(Value::String(v.to_string())))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(Value::String(v)))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        Entry::deserialize(deserializer).map(|entry| entry.0)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(Entry(item)) = seq.next_element::<Entry>()? {
            items.extend(item);
        }
        Ok(Some(Value::Array(items)))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut table = Table::new();
        while let Some((key, Entry(value))) = map.next_entry::<String, Entry>()? {
            if let Some(value) = value {
                table.insert(key, value);
            }
        }
        if table.len() == 1
            && let Some(Value::String(datetime)) = table.get(TOML_DATETIME_KEY)
        {
            return Ok(Some(Value::String(datetime.clone())));
        }
        Ok(Some(Value::Table(table)))
    }
}
