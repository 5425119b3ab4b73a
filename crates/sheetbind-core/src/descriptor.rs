//! Column annotations and resolved column descriptors

use serde::{Deserialize, Serialize};

/// Number formats commonly attached to columns
pub mod formats {
    pub const ONE_DECIMAL_PLACE: &str = "0.0";
    pub const TWO_DECIMAL_PLACE: &str = "0.00";
    pub const TWO_DECIMAL_PLACE_THOUSAND_SEPARATOR: &str = "#,##0.00";
    pub const PERCENT: &str = "0%";
    pub const THOUSAND_SEPARATOR: &str = "#,##0";
    pub const NEGATIVE_RED: &str = "#,##0.00_);[Red](#,##0.00)";
}

/// Per-member annotation controlling how a member maps to a column.
///
/// Unset names are filled in during resolution: `source_name` falls back to
/// the member name and `name` to `source_name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnAttribute {
    /// Column header
    pub name: Option<String>,
    /// Backing member name
    pub source_name: Option<String>,
    /// Ordering key, lower sorts first
    pub priority: i32,
    /// Whether the column carries a value or only a header
    pub has_value: bool,
    /// Render dates through the configured date localizer
    pub as_localized_date: bool,
    /// Format used for localized dates
    pub date_format: Option<String>,
    /// Number/date format applied to the column
    pub column_format: Option<String>,
}

impl Default for ColumnAttribute {
    fn default() -> Self {
        Self {
            name: None,
            source_name: None,
            priority: 0,
            has_value: true,
            as_localized_date: false,
            date_format: None,
            column_format: None,
        }
    }
}

impl ColumnAttribute {
    /// Create an annotation with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the column header
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the backing member name
    pub fn source_name(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = Some(source_name.into());
        self
    }

    /// Set the ordering key
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Mark the column as header-only when `false`
    pub fn has_value(mut self, has_value: bool) -> Self {
        self.has_value = has_value;
        self
    }

    /// Render dates through the localizer, optionally with a format
    pub fn localized_date(mut self, date_format: Option<&str>) -> Self {
        self.as_localized_date = true;
        self.date_format = date_format.map(str::to_string);
        self
    }

    /// Set the column format
    pub fn column_format(mut self, format: impl Into<String>) -> Self {
        self.column_format = Some(format.into());
        self
    }

    /// Resolve against the member that carries this annotation
    pub fn resolve(&self, member_name: &str, source_is_field: bool) -> ColumnDescriptor {
        let source_name = self
            .source_name
            .clone()
            .unwrap_or_else(|| member_name.to_string());
        let name = self.name.clone().unwrap_or_else(|| source_name.clone());

        ColumnDescriptor {
            name,
            source_name,
            source_is_field,
            priority: self.priority,
            has_value: self.has_value,
            as_localized_date: self.as_localized_date,
            date_format: self.date_format.clone(),
            column_format: self.column_format.clone(),
        }
    }
}

/// Resolved metadata for one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column header
    pub name: String,
    /// Member or key the value is read from / written to
    pub source_name: String,
    /// Backed by a raw field rather than an accessor
    pub source_is_field: bool,
    /// Ordering key
    pub priority: i32,
    /// Whether values are written/read for this column
    pub has_value: bool,
    /// Localize date values on export
    pub as_localized_date: bool,
    /// Localized date format
    pub date_format: Option<String>,
    /// Column format hint for the document engine
    pub column_format: Option<String>,
}

impl ColumnDescriptor {
    /// A plain value column named after its source
    pub fn new(source_name: impl Into<String>, source_is_field: bool) -> Self {
        let source_name = source_name.into();
        Self {
            name: source_name.clone(),
            source_name,
            source_is_field,
            priority: 0,
            has_value: true,
            as_localized_date: false,
            date_format: None,
            column_format: None,
        }
    }

    /// Same column with an explicit ordering key
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Stable sort by priority, keeping discovery order for ties
pub fn sort_by_priority(columns: &mut [ColumnDescriptor]) {
    columns.sort_by_key(|c| c.priority);
}
