//! sheetbind-core: Column discovery and value mapping between records and sheets
//!
//! This library provides functionality to:
//! - Resolve the ordered column list of a record type, a dynamic record or a cursor
//! - Read record values for export and assign imported cell text back onto records
//! - Drive a document sink to write sheets with headers, row numbers and formats
//! - Parse CSV into text sheets and import them as typed or dynamic records

pub mod accessor;
pub mod cursor;
pub mod descriptor;
pub mod error;
pub mod export;
pub mod grid;
pub mod import;
pub mod localize;
pub mod parser;
pub mod record;
pub mod resolver;
pub mod settings;
pub mod shape;
pub mod sink;
pub mod value;

#[cfg(test)]
mod test_support;

pub use accessor::{assign_dynamic_row, assign_from_row, DefaultValueAccessor, RowValues, ValueAccessor};
pub use cursor::{pair_columns, read_cursor_rows, CursorColumnPairing, MemoryCursor, TabularCursor, MAX_ROWS};
pub use descriptor::{formats, ColumnAttribute, ColumnDescriptor};
pub use error::{Error, Result};
pub use export::SheetBuilder;
pub use grid::{GridSheet, GridSink, TextSheet};
pub use import::SheetImporter;
pub use localize::{DateLocalizer, JalaliLocalizer};
pub use parser::{parse_csv, parse_csv_str};
pub use record::{DynamicRecord, Record};
pub use resolver::{resolve_columns, AttributeColumnResolver, ColumnResolver, ManualColumnResolver};
pub use settings::ExportSettings;
pub use shape::{DataShape, Member, MemberKind, ShapeTable, Tabular};
pub use sink::{DocumentSink, RenderCell, RowRenderer};
pub use value::{CellValue, DeclaredType, FromCell, ValueType};
