//! In-memory document engine and plain-text sheets

use crate::error::{Error, Result};
use crate::sink::DocumentSink;
use crate::value::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// A sheet as rows of cell text, header first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextSheet {
    /// Sheet name
    pub name: String,
    /// All rows including the header
    pub rows: Vec<Vec<String>>,
}

impl TextSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// The header row
    pub fn header(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rows after the header
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Get the number of data rows
    pub fn row_count(&self) -> usize {
        self.data_rows().len()
    }

    /// Write as CSV to a file
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path).map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.write_rows(&mut writer, path)?;
        info!(sheet = %self.name, path = %path.display(), "wrote CSV");
        Ok(())
    }

    /// Render as a CSV string
    pub fn to_csv_string(&self) -> Result<String> {
        let label = PathBuf::from(format!("<{}>", self.name));
        let mut writer = csv::Writer::from_writer(Vec::new());
        self.write_rows(&mut writer, &label)?;
        let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| Error::CsvParse {
            path: label,
            message: e.to_string(),
        })
    }

    fn write_rows<W: io::Write>(&self, writer: &mut csv::Writer<W>, path: &Path) -> Result<()> {
        for row in &self.rows {
            writer.write_record(row).map_err(|e| Error::Csv {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// One sheet held by [`GridSink`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridSheet {
    /// Sheet name
    pub name: String,
    cells: BTreeMap<(usize, usize), CellValue>,
    styles: BTreeMap<(usize, usize), String>,
    cell_formats: BTreeMap<(usize, usize), String>,
    column_formats: BTreeMap<usize, String>,
    finalized: bool,
}

impl GridSheet {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    pub fn style(&self, row: usize, col: usize) -> Option<&str> {
        self.styles.get(&(row, col)).map(String::as_str)
    }

    pub fn cell_format(&self, row: usize, col: usize) -> Option<&str> {
        self.cell_formats.get(&(row, col)).map(String::as_str)
    }

    pub fn column_format(&self, col: usize) -> Option<&str> {
        self.column_formats.get(&col).map(String::as_str)
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Number of rows holding values, header included
    pub fn row_count(&self) -> usize {
        self.cells.keys().map(|(r, _)| r + 1).max().unwrap_or(0)
    }

    /// Number of columns holding values
    pub fn column_count(&self) -> usize {
        self.cells.keys().map(|(_, c)| c + 1).max().unwrap_or(0)
    }

    /// Render every cell as text; unset cells are blank
    pub fn to_text(&self) -> TextSheet {
        let columns = self.column_count();
        let rows = (0..self.row_count())
            .map(|r| {
                (0..columns)
                    .map(|c| self.cell(r, c).map(CellValue::to_string_value).unwrap_or_default())
                    .collect()
            })
            .collect();
        TextSheet::new(self.name.clone(), rows)
    }
}

/// A [`DocumentSink`] that keeps every sheet in memory
#[derive(Debug, Clone, Default)]
pub struct GridSink {
    sheets: Vec<GridSheet>,
    current: Option<usize>,
}

impl GridSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheets(&self) -> &[GridSheet] {
        &self.sheets
    }

    /// Find a sheet by name
    pub fn sheet(&self, name: &str) -> Result<&GridSheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    fn active(&mut self) -> Result<&mut GridSheet> {
        let index = self.current.ok_or(Error::NoActiveSheet)?;
        self.sheets.get_mut(index).ok_or(Error::NoActiveSheet)
    }
}

impl DocumentSink for GridSink {
    fn create_sheet(&mut self, name: &str) -> Result<()> {
        if self.sheets.iter().any(|s| s.name == name) {
            return Err(Error::DuplicateSheet(name.to_string()));
        }
        self.sheets.push(GridSheet::new(name));
        self.current = Some(self.sheets.len() - 1);
        Ok(())
    }

    fn set_cell(&mut self, row: usize, col: usize, value: CellValue) -> Result<()> {
        self.active()?.cells.insert((row, col), value);
        Ok(())
    }

    fn set_cell_style(&mut self, row: usize, col: usize, style: &str) -> Result<()> {
        self.active()?.styles.insert((row, col), style.to_string());
        Ok(())
    }

    fn set_column_format(&mut self, col: usize, format: &str) -> Result<()> {
        self.active()?.column_formats.insert(col, format.to_string());
        Ok(())
    }

    fn set_cell_format(&mut self, row: usize, col: usize, format: &str) -> Result<()> {
        self.active()?
            .cell_formats
            .insert((row, col), format.to_string());
        Ok(())
    }

    fn finalize_sheet(&mut self) -> Result<()> {
        self.active()?.finalized = true;
        self.current = None;
        Ok(())
    }
}
