//! Export driver: writes records, dynamic records or cursor rows to a sink

use crate::accessor::{DefaultValueAccessor, RowValues, ValueAccessor};
use crate::cursor::{pair_columns, read_cursor_rows, TabularCursor, MAX_ROWS};
use crate::descriptor::ColumnDescriptor;
use crate::error::{Error, Result};
use crate::localize::DateLocalizer;
use crate::record::{DynamicRecord, Record};
use crate::resolver::{AttributeColumnResolver, ColumnResolver};
use crate::settings::ExportSettings;
use crate::shape::{DataShape, Tabular};
use crate::sink::{DocumentSink, RenderCell, RowRenderer};
use crate::value::CellValue;
use chrono::{NaiveDateTime, NaiveTime};
use tracing::{info, warn};

/// Builds sheets on a [`DocumentSink`].
///
/// Row 0 holds the headers. With a row number column, data columns start at
/// column 1. Every source is cut off after [`MAX_ROWS`] rows.
pub struct SheetBuilder<S: DocumentSink> {
    sink: S,
    settings: ExportSettings,
    resolver: Box<dyn ColumnResolver>,
    accessor: Box<dyn ValueAccessor>,
    renderer: Option<Box<dyn RowRenderer>>,
    localizer: Option<Box<dyn DateLocalizer>>,
}

impl<S: DocumentSink> SheetBuilder<S> {
    /// Every member becomes a column, values read with the default accessor
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            settings: ExportSettings::default(),
            resolver: Box::new(AttributeColumnResolver::new(false)),
            accessor: Box::new(DefaultValueAccessor),
            renderer: None,
            localizer: None,
        }
    }

    pub fn with_settings(mut self, settings: ExportSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_resolver(mut self, resolver: impl ColumnResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_accessor(mut self, accessor: impl ValueAccessor + 'static) -> Self {
        self.accessor = Box::new(accessor);
        self
    }

    pub fn with_renderer(mut self, renderer: impl RowRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn with_localizer(mut self, localizer: impl DateLocalizer + 'static) -> Self {
        self.localizer = Some(Box::new(localizer));
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Add a sheet of static records. An empty input still produces the header.
    pub fn add_sheet<'r, T, I>(&mut self, name: &str, records: I) -> Result<&mut Self>
    where
        T: Tabular + 'r,
        I: IntoIterator<Item = &'r T>,
    {
        let shape = T::shape();
        let columns = self.resolver.resolve(DataShape::Static(&shape), None)?;
        let records = records.into_iter().map(|r| Record::Static(r));
        self.write_records(name, &columns, records)?;
        Ok(self)
    }

    /// Add a sheet of dynamic records, taking columns from the first record
    pub fn add_dynamic_sheet<'r, I>(&mut self, name: &str, records: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = &'r DynamicRecord>,
    {
        let mut records = records.into_iter().peekable();
        let first = records.peek().copied().ok_or_else(|| Error::EmptyDataset {
            sheet: name.to_string(),
        })?;

        let columns = self.resolver.resolve(DataShape::Dynamic, Some(first))?;
        self.write_records(name, &columns, records.map(Record::Dynamic))?;
        Ok(self)
    }

    /// Add a sheet from a cursor. `columns` supplies descriptors for cursor
    /// columns by source name; the rest are synthesized.
    pub fn add_cursor_sheet<C>(
        &mut self,
        name: &str,
        cursor: &mut C,
        columns: &[ColumnDescriptor],
    ) -> Result<&mut Self>
    where
        C: TabularCursor + ?Sized,
    {
        let mut pairings = pair_columns(cursor, columns);
        pairings.sort_by_key(|p| p.column.priority);

        let layout: Vec<ColumnDescriptor> = pairings.iter().map(|p| p.column.clone()).collect();
        self.prepare_sheet(name, &layout)?;

        let rows = read_cursor_rows(cursor, &pairings, |row, values| {
            self.write_row_number(row)?;
            for (index, (column, value)) in layout.iter().zip(values.iter()).enumerate() {
                self.write_cell(row, index, column, value, None)?;
            }
            Ok(())
        })?;

        self.sink.finalize_sheet()?;
        info!(sheet = name, rows, "cursor sheet written");
        Ok(self)
    }

    fn write_records<'r>(
        &mut self,
        name: &str,
        columns: &[ColumnDescriptor],
        records: impl Iterator<Item = Record<'r>>,
    ) -> Result<()> {
        self.prepare_sheet(name, columns)?;

        let mut rows = 0;
        for record in records {
            rows += 1;
            let values = self.accessor.read_row(columns, record)?;

            self.write_row_number(rows)?;
            for (index, column) in columns.iter().enumerate() {
                let value = values.get(&column.source_name).unwrap_or(&CellValue::Empty);
                self.write_cell(rows, index, column, value, Some(&values))?;
            }

            if rows == MAX_ROWS {
                warn!(sheet = name, rows, "row ceiling reached, remaining records ignored");
                break;
            }
        }

        self.sink.finalize_sheet()?;
        info!(sheet = name, rows, "sheet written");
        Ok(())
    }

    fn prepare_sheet(&mut self, name: &str, columns: &[ColumnDescriptor]) -> Result<()> {
        self.sink.create_sheet(name)?;

        if self.settings.has_row_number {
            let header = CellValue::String(self.settings.row_number_column_name.clone());
            self.sink.set_cell(0, 0, header)?;
            if let Some(style) = &self.settings.header_style {
                self.sink.set_cell_style(0, 0, style)?;
            }
        }

        let offset = self.settings.first_data_column();
        for (i, column) in columns.iter().enumerate() {
            let col = offset + i;
            self.sink.set_cell(0, col, CellValue::String(column.name.clone()))?;
            if let Some(style) = &self.settings.header_style {
                self.sink.set_cell_style(0, col, style)?;
            }
            if let Some(format) = &column.column_format {
                self.sink.set_column_format(col, format)?;
            }
        }

        Ok(())
    }

    fn write_row_number(&mut self, row: usize) -> Result<()> {
        if self.settings.has_row_number {
            self.sink.set_cell(row, 0, CellValue::Integer(row as i64))?;
        }
        Ok(())
    }

    fn write_cell(
        &mut self,
        row: usize,
        index: usize,
        column: &ColumnDescriptor,
        value: &CellValue,
        row_values: Option<&RowValues>,
    ) -> Result<()> {
        let col = self.settings.first_data_column() + index;

        if let Some(style) = &self.settings.cell_style {
            self.sink.set_cell_style(row, col, style)?;
        }

        if let Some(renderer) = self.renderer.as_mut() {
            let cell = RenderCell {
                row,
                col,
                column,
                value: column.has_value.then_some(value),
                row_values,
            };
            if renderer.render(&mut self.sink, &cell)? {
                return Ok(());
            }
        }

        if !column.has_value {
            return Ok(());
        }

        if column.as_localized_date {
            if let (Some(localizer), Some(dt)) = (&self.localizer, as_date_time(value)) {
                let format = column
                    .date_format
                    .as_deref()
                    .unwrap_or(&self.settings.localized_date_format);
                let text = localizer.localize(dt, format);
                return self.sink.set_cell(row, col, CellValue::String(text));
            }
        }

        self.sink.set_cell(row, col, value.clone())?;

        let default_format = match value {
            CellValue::DateTime(_) => &self.settings.date_time_format,
            CellValue::Date(_) => &self.settings.date_format,
            _ => return Ok(()),
        };
        let format = column.column_format.as_deref().unwrap_or(default_format);
        self.sink.set_cell_format(row, col, format)
    }
}

fn as_date_time(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Date(d) => Some(d.and_time(NaiveTime::MIN)),
        _ => None,
    }
}
