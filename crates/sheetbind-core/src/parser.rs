//! CSV reader producing text sheets for import

use crate::error::{Error, Result};
use crate::grid::TextSheet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::warn;

/// Parse a CSV file into a TextSheet named after the file stem
pub fn parse_csv<P: AsRef<Path>>(path: P) -> Result<TextSheet> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1");

    read_sheet(BufReader::new(file), name, path)
}

/// Parse CSV from a string (useful for testing)
pub fn parse_csv_str(content: &str, sheet_name: &str) -> Result<TextSheet> {
    read_sheet(content.as_bytes(), sheet_name, Path::new(sheet_name))
}

fn read_sheet<R: Read>(reader: R, name: &str, path: &Path) -> Result<TextSheet> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(Error::CsvParse {
            path: path.to_path_buf(),
            message: "no columns found in CSV".to_string(),
        });
    }

    let width = headers.len();
    let mut rows = vec![headers];

    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();

        if cells.len() > width {
            warn!(
                row = row_idx + 1,
                path = %path.display(),
                "row has more cells than columns, truncating"
            );
        }
        cells.resize(width, String::new());

        rows.push(cells);
    }

    Ok(TextSheet::new(name, rows))
}
