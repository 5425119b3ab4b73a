//! Error types for sheetbind-core

use crate::value::ValueType;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in sheetbind-core
#[derive(Debug, Error)]
pub enum Error {
    /// A dynamic shape was resolved without a sample record to introspect
    #[error("dynamic shape cannot be resolved without a sample record")]
    MissingSample,

    /// A dynamic record lacks a key its column set expects
    #[error("key '{key}' not found in dynamic record")]
    KeyNotFound { key: String },

    /// Cell text or a cursor value could not be converted to the target type
    #[error("row {row}, column '{column}': cannot convert '{value}' to {target}")]
    Coercion {
        row: usize,
        column: String,
        value: String,
        target: ValueType,
    },

    /// Export of a type-erased or dynamic dataset with no records
    #[error("sheet '{sheet}' has no records to derive columns from")]
    EmptyDataset { sheet: String },

    /// A record was asked to assign a member it does not declare
    #[error("record has no member named '{member}'")]
    UnknownMember { member: String },

    /// A record member received a value of the wrong type
    #[error("member '{member}' expects {expected}, found {found}")]
    TypeMismatch {
        member: String,
        expected: ValueType,
        found: String,
    },

    /// No sheet with this name exists
    #[error("sheet '{0}' not found")]
    SheetNotFound(String),

    /// A sheet with this name already exists
    #[error("sheet '{0}' already exists")]
    DuplicateSheet(String),

    /// A cell was written before any sheet was created
    #[error("no sheet has been created")]
    NoActiveSheet,

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse CSV
    #[error("failed to parse CSV '{path}': {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
