//! The document engine seam used by the export driver

use crate::accessor::RowValues;
use crate::descriptor::ColumnDescriptor;
use crate::error::Result;
use crate::value::CellValue;

/// Receives sheets cell by cell. Rows and columns are zero-based.
pub trait DocumentSink {
    /// Start a new sheet; subsequent calls target it
    fn create_sheet(&mut self, name: &str) -> Result<()>;

    fn set_cell(&mut self, row: usize, col: usize, value: CellValue) -> Result<()>;

    fn set_cell_style(&mut self, row: usize, col: usize, style: &str) -> Result<()>;

    fn set_column_format(&mut self, col: usize, format: &str) -> Result<()>;

    fn set_cell_format(&mut self, row: usize, col: usize, format: &str) -> Result<()>;

    /// Finish the current sheet
    fn finalize_sheet(&mut self) -> Result<()>;
}

/// A cell about to be rendered
#[derive(Debug, Clone, Copy)]
pub struct RenderCell<'a> {
    /// Sheet row
    pub row: usize,
    /// Sheet column
    pub col: usize,
    /// Column being rendered
    pub column: &'a ColumnDescriptor,
    /// The value, `None` for columns without a value
    pub value: Option<&'a CellValue>,
    /// The whole row; absent for cursor sources
    pub row_values: Option<&'a RowValues>,
}

/// Per-cell rendering hook.
///
/// Returns `true` when it fully handled the cell, which skips the default
/// value and format handling.
pub trait RowRenderer {
    fn render(&mut self, sink: &mut dyn DocumentSink, cell: &RenderCell<'_>) -> Result<bool>;
}

impl<F> RowRenderer for F
where
    F: FnMut(&mut dyn DocumentSink, &RenderCell<'_>) -> Result<bool>,
{
    fn render(&mut self, sink: &mut dyn DocumentSink, cell: &RenderCell<'_>) -> Result<bool> {
        self(sink, cell)
    }
}
