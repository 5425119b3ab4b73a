//! Import driver: builds records from text sheets

use crate::accessor::{assign_dynamic_row, assign_from_row};
use crate::cursor::MAX_ROWS;
use crate::descriptor::ColumnDescriptor;
use crate::error::Result;
use crate::grid::TextSheet;
use crate::record::DynamicRecord;
use crate::resolver::{AttributeColumnResolver, ColumnResolver};
use crate::shape::{DataShape, Tabular};
use crate::value::CellValue;
use tracing::{debug, info, warn};

/// Reads sheets back into records.
///
/// Header cells are matched against column names; sheet columns with no
/// matching descriptor are ignored. Row numbers in errors count the header
/// as row 1.
pub struct SheetImporter {
    resolver: Box<dyn ColumnResolver>,
}

impl Default for SheetImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetImporter {
    /// Every member is a column
    pub fn new() -> Self {
        Self {
            resolver: Box::new(AttributeColumnResolver::new(false)),
        }
    }

    pub fn with_resolver(mut self, resolver: impl ColumnResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    /// Import records starting from `T::default()`
    pub fn import<T>(&self, sheet: &TextSheet) -> Result<Vec<T>>
    where
        T: Tabular + Default,
    {
        self.import_with(sheet, T::default)
    }

    /// Import records, each starting from a value produced by `factory`
    pub fn import_with<T, F>(&self, sheet: &TextSheet, mut factory: F) -> Result<Vec<T>>
    where
        T: Tabular,
        F: FnMut() -> T,
    {
        let shape = T::shape();
        let columns = self.resolver.resolve(DataShape::Static(&shape), None)?;
        let layout = HeaderLayout::new(sheet.header(), &columns);

        let mut records = Vec::with_capacity(sheet.row_count().min(MAX_ROWS));
        for (i, row) in bounded_rows(sheet) {
            let cells = layout.cells(row);
            records.push(assign_from_row(&columns, &shape, &cells, i + 2, &mut factory)?);
        }

        info!(sheet = %sheet.name, shape = %shape.name, rows = records.len(), "imported sheet");
        Ok(records)
    }

    /// Import dynamic records keyed by column source name
    pub fn import_dynamic(&self, sheet: &TextSheet) -> Result<Vec<DynamicRecord>> {
        let sample: DynamicRecord = sheet
            .header()
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .map(|h| (h.to_string(), CellValue::Empty))
            .collect();

        let columns = self.resolver.resolve(DataShape::Dynamic, Some(&sample))?;
        let layout = HeaderLayout::new(sheet.header(), &columns);

        let records: Vec<DynamicRecord> = bounded_rows(sheet)
            .map(|(_, row)| assign_dynamic_row(&columns, &layout.cells(row)))
            .collect();

        info!(sheet = %sheet.name, rows = records.len(), "imported dynamic sheet");
        Ok(records)
    }
}

fn bounded_rows(sheet: &TextSheet) -> impl Iterator<Item = (usize, &Vec<String>)> {
    if sheet.row_count() > MAX_ROWS {
        warn!(sheet = %sheet.name, rows = sheet.row_count(), "row ceiling reached, remaining rows ignored");
    }
    sheet.data_rows().iter().enumerate().take(MAX_ROWS)
}

/// Sheet column index for each descriptor, in descriptor order
struct HeaderLayout {
    positions: Vec<Option<usize>>,
}

impl HeaderLayout {
    fn new(header: &[String], columns: &[ColumnDescriptor]) -> Self {
        let positions = columns
            .iter()
            .map(|column| {
                let position = header.iter().position(|h| h.trim() == column.name);
                if position.is_none() {
                    debug!(column = %column.name, "column not present in sheet header");
                }
                position
            })
            .collect();
        Self { positions }
    }

    fn cells<'a>(&self, row: &'a [String]) -> Vec<&'a str> {
        self.positions
            .iter()
            .map(|p| p.and_then(|i| row.get(i)).map_or("", String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ColumnAttribute;
    use crate::error::Error;
    use crate::export::SheetBuilder;
    use crate::grid::GridSink;
    use crate::parser::parse_csv_str;
    use crate::resolver::ManualColumnResolver;
    use crate::settings::ExportSettings;
    use crate::test_support::{date, Person};
    use crate::value::ValueType;

    fn attributed() -> SheetImporter {
        SheetImporter::new().with_resolver(AttributeColumnResolver::new(true))
    }

    fn people() -> Vec<Person> {
        vec![
            Person::new(1, "Ada", true, Some(date(1815, 12, 10)), Some(90)),
            Person::new(2, "Alan", false, None, None),
        ]
    }

    #[test]
    fn test_export_then_import_keeps_records() {
        let settings = ExportSettings {
            has_row_number: true,
            ..ExportSettings::default()
        };
        let mut builder = SheetBuilder::new(GridSink::new())
            .with_settings(settings)
            .with_resolver(AttributeColumnResolver::new(true));
        builder.add_sheet("People", &people()).unwrap();

        let sink = builder.into_sink();
        let sheet = sink.sheet("People").unwrap().to_text();
        let imported: Vec<Person> = attributed().import(&sheet).unwrap();

        assert_eq!(imported, people());
    }

    #[test]
    fn test_manual_columns_round_trip_field_members() {
        let columns = || {
            ManualColumnResolver::from_attributes(&[
                ColumnAttribute::new().source_name("id").name("Id"),
                ColumnAttribute::new().source_name("name").name("Name").priority(1),
            ])
        };
        let original = vec![Person::new(42, "Ada", false, None, None)];

        let mut builder = SheetBuilder::new(GridSink::new()).with_resolver(columns());
        builder.add_sheet("People", &original).unwrap();
        let sink = builder.into_sink();
        let sheet = sink.sheet("People").unwrap().to_text();
        assert_eq!(sheet.rows, vec![vec!["Id", "Name"], vec!["42", "Ada"]]);

        let imported: Vec<Person> = SheetImporter::new()
            .with_resolver(columns())
            .import(&sheet)
            .unwrap();
        assert_eq!(imported, original);
    }

    #[test]
    fn test_columns_matched_by_header_text() {
        let sheet = parse_csv_str("Name,Extra,Id\nGrace,x,7\n", "s").unwrap();
        let imported: Vec<Person> = attributed().import(&sheet).unwrap();

        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].id, 7);
        assert_eq!(imported[0].name, "Grace");
        assert!(!imported[0].active);
        assert_eq!(imported[0].score, None);
    }

    #[test]
    fn test_conversion_error_reports_sheet_row() {
        let sheet = parse_csv_str("Id,Name\n1,ok\nnope,bad\n", "s").unwrap();
        let err = attributed().import::<Person>(&sheet).unwrap_err();

        match err {
            Error::Coercion {
                row,
                column,
                value,
                target,
            } => {
                assert_eq!(row, 3);
                assert_eq!(column, "Id");
                assert_eq!(value, "nope");
                assert_eq!(target, ValueType::Integer);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_factory_values_survive_blank_cells() {
        let sheet = parse_csv_str("Id,Name,Active\n,Linus,\n", "s").unwrap();
        let imported = attributed()
            .import_with(&sheet, || {
                let mut p = Person::new(99, "", true, None, None);
                p.internal = "seed".to_string();
                p
            })
            .unwrap();

        assert_eq!(imported[0].id, 99);
        assert_eq!(imported[0].name, "Linus");
        assert!(imported[0].active);
        assert_eq!(imported[0].internal, "seed");
    }

    #[test]
    fn test_import_dynamic_detects_types() {
        let sheet = parse_csv_str("sku,qty,seen\nA-1,3,2024/01/05\nB-2,,\n", "s").unwrap();
        let records = SheetImporter::new().import_dynamic(&sheet).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("sku"), Some(&CellValue::from("A-1")));
        assert_eq!(records[0].get("qty"), Some(&CellValue::Integer(3)));
        assert_eq!(records[0].get("seen"), Some(&CellValue::Date(date(2024, 1, 5))));
        assert_eq!(records[1].get("qty"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_import_dynamic_with_manual_columns() {
        let resolver = ManualColumnResolver::from_attributes(&[
            ColumnAttribute::new().source_name("code").name("Code"),
            ColumnAttribute::new().name("Notes").has_value(false),
        ]);
        let sheet = parse_csv_str("Notes,Code\nignored,X9\n", "s").unwrap();
        let records = SheetImporter::new()
            .with_resolver(resolver)
            .import_dynamic(&sheet)
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].keys().collect::<Vec<_>>(), vec!["code"]);
        assert_eq!(records[0].get("code"), Some(&CellValue::from("X9")));
    }

    #[test]
    fn test_header_only_sheet_imports_nothing() {
        let sheet = parse_csv_str("Id,Name\n", "s").unwrap();
        let imported: Vec<Person> = attributed().import(&sheet).unwrap();
        assert!(imported.is_empty());
    }
}
