//! Record handles: static typed records and dynamic key/value records

use crate::shape::Tabular;
use crate::value::CellValue;
use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// A schema-less record: an insertion-ordered key/value map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DynamicRecord {
    values: IndexMap<String, CellValue>,
}

impl DynamicRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, keeping its original position if it already exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CellValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a value by exact key
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.values.get(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Key/value pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build from a JSON object. Nested arrays and objects are kept as JSON text.
    pub fn from_json(object: &Map<String, Value>) -> Self {
        let values = object
            .iter()
            .map(|(k, v)| (k.clone(), json_to_cell(v)))
            .collect();
        Self { values }
    }

    /// Convert to a JSON object with plain JSON values
    pub fn to_json(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), cell_to_json(v)))
            .collect()
    }
}

impl FromIterator<(String, CellValue)> for DynamicRecord {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

fn json_to_cell(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::Bool(b) => CellValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => CellValue::Integer(i),
            None => n
                .as_f64()
                .map(CellValue::Float)
                .unwrap_or_else(|| CellValue::String(n.to_string())),
        },
        Value::String(s) => string_to_cell(s),
        other => CellValue::String(other.to_string()),
    }
}

// JSON has no date type; only exact date renderings are promoted
fn string_to_cell(s: &str) -> CellValue {
    match CellValue::parse(s) {
        v @ (CellValue::Date(_) | CellValue::DateTime(_)) => v,
        _ => CellValue::String(s.to_string()),
    }
}

fn cell_to_json(value: &CellValue) -> Value {
    match value {
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Integer(i) => Value::Number((*i).into()),
        CellValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        CellValue::String(s) => Value::String(s.clone()),
        CellValue::Date(d) => Value::String(format_date(d)),
        CellValue::DateTime(dt) => Value::String(format_date_time(dt)),
        CellValue::Empty => Value::Null,
    }
}

fn format_date(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn format_date_time(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// A record handed to the value accessor
#[derive(Clone, Copy)]
pub enum Record<'a> {
    /// A typed record with a registered shape
    Static(&'a dyn Tabular),
    /// A dynamic key/value record
    Dynamic(&'a DynamicRecord),
}
