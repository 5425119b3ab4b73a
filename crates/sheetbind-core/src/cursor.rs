//! Row cursors: forward-only, typed, named-column row sources

use crate::descriptor::ColumnDescriptor;
use crate::error::{Error, Result};
use crate::value::{CellValue, ValueType};
use tracing::{debug, warn};

/// Hard ceiling on rows read from any single source
pub const MAX_ROWS: usize = 1_000_000;

/// A forward-only row source with named, typed columns
pub trait TabularCursor {
    /// Advance to the next row, `false` at the end
    fn read(&mut self) -> Result<bool>;

    /// Number of columns
    fn field_count(&self) -> usize;

    /// Column name at `i`
    fn name(&self, i: usize) -> &str;

    /// Declared column type at `i`, `None` if unknown
    fn field_type(&self, i: usize) -> Option<ValueType>;

    /// Raw value at `i` in the current row
    fn value(&self, i: usize) -> CellValue;

    /// Whether the value at `i` is the provider's null
    fn is_null(&self, i: usize) -> bool;
}

/// A cursor column bound to the descriptor sharing its source name
#[derive(Debug, Clone, PartialEq)]
pub struct CursorColumnPairing {
    /// Zero-based cursor column
    pub cursor_index: usize,
    /// Type values are coerced to
    pub declared_type: ValueType,
    /// Matched or synthesized descriptor
    pub column: ColumnDescriptor,
}

/// Pair every typed cursor column with a descriptor.
///
/// Columns are matched by exact `source_name`. A column with no match gets a
/// synthesized descriptor named after it with `priority` equal to its index.
/// Columns whose type is unknown are skipped.
pub fn pair_columns<C>(cursor: &C, columns: &[ColumnDescriptor]) -> Vec<CursorColumnPairing>
where
    C: TabularCursor + ?Sized,
{
    let mut pairings = Vec::with_capacity(cursor.field_count());

    for i in 0..cursor.field_count() {
        let name = cursor.name(i);
        let Some(declared_type) = cursor.field_type(i) else {
            debug!(column = name, index = i, "cursor column has no type, skipping");
            continue;
        };

        let column = columns
            .iter()
            .find(|c| c.source_name == name)
            .cloned()
            .unwrap_or_else(|| ColumnDescriptor::new(name, false).with_priority(i as i32));

        pairings.push(CursorColumnPairing {
            cursor_index: i,
            declared_type,
            column,
        });
    }

    debug!(count = pairings.len(), "paired cursor columns");
    pairings
}

/// Read cursor rows, calling `visit` with the 1-based row number and the
/// row's values in pairing order.
///
/// Null values become `Empty`, everything else is coerced to the pairing's
/// type. Reading stops after [`MAX_ROWS`] rows. Returns the number of rows
/// processed.
pub fn read_cursor_rows<C, F>(
    cursor: &mut C,
    pairings: &[CursorColumnPairing],
    mut visit: F,
) -> Result<usize>
where
    C: TabularCursor + ?Sized,
    F: FnMut(usize, Vec<CellValue>) -> Result<()>,
{
    let mut count = 0;

    while cursor.read()? {
        count += 1;

        let mut values = Vec::with_capacity(pairings.len());
        for pairing in pairings {
            values.push(read_value(cursor, pairing, count)?);
        }
        visit(count, values)?;

        if count == MAX_ROWS {
            warn!(rows = MAX_ROWS, "row ceiling reached, remaining cursor rows ignored");
            break;
        }
    }

    Ok(count)
}

fn read_value<C>(cursor: &C, pairing: &CursorColumnPairing, row: usize) -> Result<CellValue>
where
    C: TabularCursor + ?Sized,
{
    let i = pairing.cursor_index;
    if cursor.is_null(i) {
        return Ok(CellValue::Empty);
    }

    let raw = cursor.value(i);
    let text = raw.to_string_value();
    raw.coerce(pairing.declared_type).ok_or_else(|| Error::Coercion {
        row,
        column: pairing.column.name.clone(),
        value: text,
        target: pairing.declared_type,
    })
}

/// An in-memory cursor over prepared rows
#[derive(Debug, Clone, Default)]
pub struct MemoryCursor {
    columns: Vec<(String, Option<ValueType>)>,
    rows: Vec<Vec<CellValue>>,
    position: Option<usize>,
}

impl MemoryCursor {
    /// Create a cursor with the given column names and types
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = (S, Option<ValueType>)>) -> Self {
        Self {
            columns: columns.into_iter().map(|(n, t)| (n.into(), t)).collect(),
            rows: Vec::new(),
            position: None,
        }
    }

    /// Append a row
    pub fn row(mut self, values: Vec<CellValue>) -> Self {
        self.rows.push(values);
        self
    }

    fn current(&self) -> Option<&Vec<CellValue>> {
        self.position.and_then(|p| self.rows.get(p))
    }
}

impl TabularCursor for MemoryCursor {
    fn read(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        self.position = Some(next.min(self.rows.len()));
        Ok(next < self.rows.len())
    }

    fn field_count(&self) -> usize {
        self.columns.len()
    }

    fn name(&self, i: usize) -> &str {
        self.columns.get(i).map(|(n, _)| n.as_str()).unwrap_or("")
    }

    fn field_type(&self, i: usize) -> Option<ValueType> {
        self.columns.get(i).and_then(|(_, t)| *t)
    }

    fn value(&self, i: usize) -> CellValue {
        self.current()
            .and_then(|row| row.get(i))
            .cloned()
            .unwrap_or(CellValue::Empty)
    }

    fn is_null(&self, i: usize) -> bool {
        self.value(i).is_empty()
    }
}
