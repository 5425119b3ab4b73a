//! Export settings

use crate::error::{Error, Result};
use crate::localize::DEFAULT_LOCALIZED_FORMAT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Sheet layout and default formats used by the export driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Prepend a 1-based row number column
    pub has_row_number: bool,
    /// Header of the row number column
    pub row_number_column_name: String,
    /// Named style applied to header cells
    pub header_style: Option<String>,
    /// Named style applied to data cells
    pub cell_style: Option<String>,
    /// Cell format for date-time values without a column format
    pub date_time_format: String,
    /// Cell format for date values without a column format
    pub date_format: String,
    /// Format for localized dates without a column date format
    pub localized_date_format: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            has_row_number: false,
            row_number_column_name: "Row".to_string(),
            header_style: None,
            cell_style: None,
            date_time_format: "yyyy/MM/dd HH:mm:ss".to_string(),
            date_format: "yyyy/MM/dd".to_string(),
            localized_date_format: DEFAULT_LOCALIZED_FORMAT.to_string(),
        }
    }
}

impl ExportSettings {
    /// First sheet column holding data
    pub fn first_data_column(&self) -> usize {
        usize::from(self.has_row_number)
    }

    /// Load settings from JSON; missing keys take defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save settings to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
