//! Cell values and the type coercions shared by export, import and cursors

use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text layout used when a date-time value is rendered into a cell
pub const DATE_TIME_TEXT: &str = "%Y/%m/%d %H:%M:%S";

/// Text layout used when a date value is rendered into a cell
pub const DATE_TEXT: &str = "%Y/%m/%d";

const DATE_TIME_INPUTS: &[&str] = &[
    DATE_TIME_TEXT,
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_INPUTS: &[&str] = &[DATE_TEXT, "%Y-%m-%d"];

/// The value types a member or cursor column can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Integer,
    Float,
    String,
    Date,
    DateTime,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Date => "date",
            ValueType::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// The declared type of a record member, possibly wrapped as nullable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclaredType {
    /// A plain value that always holds something
    Value(ValueType),
    /// An optional value (`Option<T>` on the record)
    Nullable(ValueType),
}

impl DeclaredType {
    /// The value type with any nullable wrapper removed
    pub fn inner(self) -> ValueType {
        match self {
            DeclaredType::Value(t) | DeclaredType::Nullable(t) => t,
        }
    }

    /// Whether the member can hold an absent value
    pub fn is_nullable(self) -> bool {
        matches!(self, DeclaredType::Nullable(_))
    }
}

/// A single cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating-point value
    Float(f64),
    /// String value
    String(String),
    /// Calendar date
    Date(NaiveDate),
    /// Date with time of day
    DateTime(NaiveDateTime),
    /// Absent value
    Empty,
}

impl CellValue {
    /// Parse cell text into a CellValue, detecting the type
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(f);
        }

        if let Some(b) = parse_bool(trimmed) {
            return CellValue::Bool(b);
        }

        if let Some(dt) = parse_date_time(trimmed) {
            return CellValue::DateTime(dt);
        }

        if let Some(d) = parse_date(trimmed) {
            return CellValue::Date(d);
        }

        CellValue::String(trimmed.to_string())
    }

    /// Convert cell text to the given type.
    ///
    /// Blank text yields `Empty` for every target type. Returns `None` when
    /// the text is not a valid rendering of `target`.
    pub fn from_text(text: &str, target: ValueType) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Some(CellValue::Empty);
        }

        match target {
            ValueType::Bool => parse_bool(trimmed).map(CellValue::Bool),
            ValueType::Integer => trimmed.parse::<i64>().ok().map(CellValue::Integer),
            ValueType::Float => trimmed.parse::<f64>().ok().map(CellValue::Float),
            // Strings keep their surrounding whitespace
            ValueType::String => Some(CellValue::String(text.to_string())),
            ValueType::Date => parse_date(trimmed)
                .or_else(|| parse_date_time(trimmed).map(|dt| dt.date()))
                .map(CellValue::Date),
            ValueType::DateTime => parse_date_time(trimmed)
                .or_else(|| parse_date(trimmed).map(|d| d.and_time(NaiveTime::MIN)))
                .map(CellValue::DateTime),
        }
    }

    /// Convert a raw value to the given type, as done for cursor reads
    pub fn coerce(self, target: ValueType) -> Option<Self> {
        match (self, target) {
            (CellValue::Empty, _) => Some(CellValue::Empty),
            (v @ CellValue::Bool(_), ValueType::Bool)
            | (v @ CellValue::Integer(_), ValueType::Integer)
            | (v @ CellValue::Float(_), ValueType::Float)
            | (v @ CellValue::String(_), ValueType::String)
            | (v @ CellValue::Date(_), ValueType::Date)
            | (v @ CellValue::DateTime(_), ValueType::DateTime) => Some(v),
            (CellValue::Integer(i), ValueType::Float) => Some(CellValue::Float(i as f64)),
            (CellValue::Integer(i), ValueType::Bool) => Some(CellValue::Bool(i != 0)),
            (CellValue::Bool(b), ValueType::Integer) => Some(CellValue::Integer(i64::from(b))),
            (CellValue::Float(f), ValueType::Integer) => {
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Some(CellValue::Integer(f as i64))
                } else {
                    None
                }
            }
            (CellValue::Date(d), ValueType::DateTime) => {
                Some(CellValue::DateTime(d.and_time(NaiveTime::MIN)))
            }
            (CellValue::DateTime(dt), ValueType::Date) => Some(CellValue::Date(dt.date())),
            (CellValue::String(s), target) => CellValue::from_text(&s, target),
            (other, ValueType::String) => Some(CellValue::String(other.to_string_value())),
            _ => None,
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// The type of the held value, `None` when empty
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            CellValue::Bool(_) => Some(ValueType::Bool),
            CellValue::Integer(_) => Some(ValueType::Integer),
            CellValue::Float(_) => Some(ValueType::Float),
            CellValue::String(_) => Some(ValueType::String),
            CellValue::Date(_) => Some(ValueType::Date),
            CellValue::DateTime(_) => Some(ValueType::DateTime),
            CellValue::Empty => None,
        }
    }

    fn kind_name(&self) -> String {
        self.value_type()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "empty".to_string())
    }

    /// Convert into a typed member value, reporting a mismatch against `member`
    pub fn into_typed<T: FromCell>(self, member: &str) -> Result<T> {
        let found = self.kind_name();
        T::from_cell(self).ok_or_else(|| Error::TypeMismatch {
            member: member.to_string(),
            expected: T::VALUE_TYPE,
            found,
        })
    }

    /// Convert to the text shown in a cell
    pub fn to_string_value(&self) -> String {
        match self {
            CellValue::Bool(b) => b.to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::Date(d) => d.format(DATE_TEXT).to_string(),
            CellValue::DateTime(dt) => dt.format(DATE_TIME_TEXT).to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::String(s) => write!(f, "{}", s),
            CellValue::Date(d) => write!(f, "{}", d.format(DATE_TEXT)),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format(DATE_TIME_TEXT)),
            CellValue::Empty => write!(f, ""),
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_date_time(s: &str) -> Option<NaiveDateTime> {
    DATE_TIME_INPUTS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_INPUTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Conversion from a cell value into a typed record member
pub trait FromCell: Sized {
    /// The value type this member declares
    const VALUE_TYPE: ValueType;

    /// Convert, returning `None` on a type mismatch
    fn from_cell(value: CellValue) -> Option<Self>;
}

impl FromCell for bool {
    const VALUE_TYPE: ValueType = ValueType::Bool;

    fn from_cell(value: CellValue) -> Option<Self> {
        match value {
            CellValue::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl FromCell for i64 {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn from_cell(value: CellValue) -> Option<Self> {
        match value {
            CellValue::Integer(i) => Some(i),
            _ => None,
        }
    }
}

impl FromCell for i32 {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn from_cell(value: CellValue) -> Option<Self> {
        match value {
            CellValue::Integer(i) => i32::try_from(i).ok(),
            _ => None,
        }
    }
}

impl FromCell for f64 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn from_cell(value: CellValue) -> Option<Self> {
        match value {
            CellValue::Float(f) => Some(f),
            CellValue::Integer(i) => Some(i as f64),
            _ => None,
        }
    }
}

impl FromCell for String {
    const VALUE_TYPE: ValueType = ValueType::String;

    fn from_cell(value: CellValue) -> Option<Self> {
        match value {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl FromCell for NaiveDate {
    const VALUE_TYPE: ValueType = ValueType::Date;

    fn from_cell(value: CellValue) -> Option<Self> {
        match value {
            CellValue::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl FromCell for NaiveDateTime {
    const VALUE_TYPE: ValueType = ValueType::DateTime;

    fn from_cell(value: CellValue) -> Option<Self> {
        match value {
            CellValue::DateTime(dt) => Some(dt),
            _ => None,
        }
    }
}

impl<T: FromCell> FromCell for Option<T> {
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;

    fn from_cell(value: CellValue) -> Option<Self> {
        match value {
            CellValue::Empty => Some(None),
            other => T::from_cell(other).map(Some),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Integer(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}
