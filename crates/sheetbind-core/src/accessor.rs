//! Reading column values from records and assigning imported cell text

use crate::descriptor::ColumnDescriptor;
use crate::error::{Error, Result};
use crate::record::{DynamicRecord, Record};
use crate::shape::{MemberKind, ShapeTable, Tabular};
use crate::value::CellValue;
use indexmap::IndexMap;
use tracing::trace;

/// One exported row keyed by source name, in column order
pub type RowValues = IndexMap<String, CellValue>;

/// Reads column values out of records
pub trait ValueAccessor {
    /// Read one column from a record
    fn read(&self, column: &ColumnDescriptor, record: Record<'_>) -> Result<CellValue>;

    /// Read every column of a record, keyed by `source_name`. Columns
    /// without a value are `Empty` and never read.
    fn read_row(&self, columns: &[ColumnDescriptor], record: Record<'_>) -> Result<RowValues> {
        columns
            .iter()
            .map(|column| {
                let value = if column.has_value {
                    self.read(column, record)?
                } else {
                    CellValue::Empty
                };
                Ok((column.source_name.clone(), value))
            })
            .collect()
    }
}

/// Reads static members by name and dynamic records by exact key.
///
/// A member the static record does not have reads as `Empty`; a key missing
/// from a dynamic record is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueAccessor;

impl ValueAccessor for DefaultValueAccessor {
    fn read(&self, column: &ColumnDescriptor, record: Record<'_>) -> Result<CellValue> {
        match record {
            Record::Static(record) => Ok(record
                .read_member(&column.source_name)
                .unwrap_or_else(|| {
                    trace!(member = %column.source_name, "member not found, reading as empty");
                    CellValue::Empty
                })),
            Record::Dynamic(record) => {
                record
                    .get(&column.source_name)
                    .cloned()
                    .ok_or_else(|| Error::KeyNotFound {
                        key: column.source_name.clone(),
                    })
            }
        }
    }
}

fn member_kind(column: &ColumnDescriptor) -> MemberKind {
    if column.source_is_field {
        MemberKind::Field
    } else {
        MemberKind::Property
    }
}

/// Build a record from one row of cell text.
///
/// `cells` is aligned with `columns`; missing trailing cells count as blank.
/// Each cell is converted to its member's declared type (nullable wrappers
/// unwrapped) and written onto the record produced by `factory`. Blank text
/// is an absent value: nullable members receive `Empty`, other members keep
/// the factory's value. A member of the other kind is used when none of the
/// column's kind exists. Columns without a value, or whose member is not on
/// `shape`, are skipped. `row` is reported in conversion errors.
pub fn assign_from_row<T, F>(
    columns: &[ColumnDescriptor],
    shape: &ShapeTable,
    cells: &[&str],
    row: usize,
    factory: F,
) -> Result<T>
where
    T: Tabular,
    F: FnOnce() -> T,
{
    let mut record = factory();

    for (i, column) in columns.iter().enumerate() {
        if !column.has_value {
            continue;
        }

        let member = match shape.member_like(&column.source_name, member_kind(column)) {
            Some(m) => m,
            None => {
                trace!(member = %column.source_name, shape = %shape.name, "no such member, skipping");
                continue;
            }
        };

        let text = cells.get(i).copied().unwrap_or("");
        let target = member.declared.inner();
        let value = CellValue::from_text(text, target).ok_or_else(|| Error::Coercion {
            row,
            column: column.name.clone(),
            value: text.to_string(),
            target,
        })?;

        if value.is_empty() && !member.declared.is_nullable() {
            continue;
        }

        record.write_member(&member.name, value)?;
    }

    Ok(record)
}

/// Build a dynamic record from one row of cell text, detecting each cell's type
pub fn assign_dynamic_row(columns: &[ColumnDescriptor], cells: &[&str]) -> DynamicRecord {
    columns
        .iter()
        .enumerate()
        .filter(|(_, column)| column.has_value)
        .map(|(i, column)| {
            let text = cells.get(i).copied().unwrap_or("");
            (column.source_name.clone(), CellValue::parse(text))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve_columns;
    use crate::shape::DataShape;
    use crate::test_support::{date, Person};

    fn person_columns() -> Vec<ColumnDescriptor> {
        resolve_columns(DataShape::Static(&Person::shape()), None, true).unwrap()
    }

    #[test]
    fn test_read_static_members() {
        let person = Person::new(10, "Ada", true, None, Some(20));
        let accessor = DefaultValueAccessor;

        let id = ColumnDescriptor::new("id", true);
        let score = ColumnDescriptor::new("score", false);

        assert_eq!(
            accessor.read(&id, Record::Static(&person)).unwrap(),
            CellValue::Integer(10)
        );
        assert_eq!(
            accessor.read(&score, Record::Static(&person)).unwrap(),
            CellValue::Integer(20)
        );
    }

    #[test]
    fn test_missing_static_member_reads_empty() {
        let person = Person::default();
        let column = ColumnDescriptor::new("nickname", false);

        let value = DefaultValueAccessor
            .read(&column, Record::Static(&person))
            .unwrap();
        assert_eq!(value, CellValue::Empty);
    }

    #[test]
    fn test_read_row_keys_by_source_name() {
        let person = Person::new(1, "Ada", false, Some(date(1815, 12, 10)), None);
        let row = DefaultValueAccessor
            .read_row(&person_columns(), Record::Static(&person))
            .unwrap();

        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "active", "born", "score"]);
        assert_eq!(row["born"], CellValue::Date(date(1815, 12, 10)));
        assert_eq!(row["score"], CellValue::Empty);
    }

    #[test]
    fn test_read_dynamic_record() {
        let record = DynamicRecord::new()
            .with("IntField", 10i64)
            .with("IntProperty", 20i64);
        let columns = vec![
            ColumnDescriptor::new("IntProperty", false),
            ColumnDescriptor::new("IntField", false),
        ];

        let row = DefaultValueAccessor
            .read_row(&columns, Record::Dynamic(&record))
            .unwrap();
        assert_eq!(row["IntField"], CellValue::Integer(10));
        assert_eq!(row["IntProperty"], CellValue::Integer(20));
        assert_eq!(row.get_index(0).map(|(k, _)| k.as_str()), Some("IntProperty"));
    }

    #[test]
    fn test_missing_dynamic_key_fails() {
        let record = DynamicRecord::new().with("a", 1i64);
        let column = ColumnDescriptor::new("b", false);

        let err = DefaultValueAccessor
            .read(&column, Record::Dynamic(&record))
            .unwrap_err();
        assert!(matches!(err, Error::KeyNotFound { key } if key == "b"));
    }

    #[test]
    fn test_assign_from_row_converts_types() {
        let shape = Person::shape();
        let cells = ["7", "Grace", "TRUE", "1906/12/09", "99"];

        let person: Person =
            assign_from_row(&person_columns(), &shape, &cells, 2, Person::default).unwrap();

        assert_eq!(person, Person::new(7, "Grace", true, Some(date(1906, 12, 9)), Some(99)));
    }

    #[test]
    fn test_blank_cells_import_as_absent() {
        let shape = Person::shape();
        let factory = || Person {
            born: Some(date(2000, 1, 1)),
            score: Some(5),
            name: "keep".to_string(),
            ..Person::default()
        };

        let person: Person =
            assign_from_row(&person_columns(), &shape, &["3", "", "", " "], 2, factory).unwrap();

        assert_eq!(person.id, 3);
        assert_eq!(person.name, "keep");
        assert_eq!(person.born, None);
        assert_eq!(person.score, None);
    }

    #[test]
    fn test_coercion_failure_reports_context() {
        let shape = Person::shape();
        let err = assign_from_row(
            &person_columns(),
            &shape,
            &["1", "x", "maybe"],
            4,
            Person::default,
        )
        .unwrap_err();

        match err {
            Error::Coercion { row, column, value, .. } => {
                assert_eq!(row, 4);
                assert_eq!(column, "Active");
                assert_eq!(value, "maybe");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_member_of_other_kind_is_assigned() {
        let shape = Person::shape();
        // `id` is a field; a property descriptor still locates it
        let columns = vec![
            ColumnDescriptor::new("id", false),
            ColumnDescriptor::new("name", true),
        ];

        let person: Person =
            assign_from_row(&columns, &shape, &["5", "Ada"], 2, Person::default).unwrap();
        assert_eq!(person.id, 5);
        assert_eq!(person.name, "Ada");
    }

    #[test]
    fn test_read_row_skips_header_only_columns() {
        let record = DynamicRecord::new().with("sku", "A-1");
        let mut notes = ColumnDescriptor::new("Notes", false);
        notes.has_value = false;
        let columns = vec![ColumnDescriptor::new("sku", false), notes];

        let row = DefaultValueAccessor
            .read_row(&columns, Record::Dynamic(&record))
            .unwrap();
        assert_eq!(row["sku"], CellValue::from("A-1"));
        assert_eq!(row["Notes"], CellValue::Empty);
    }

    #[test]
    fn test_assign_dynamic_row() {
        let mut header_only = ColumnDescriptor::new("note", false);
        header_only.has_value = false;
        let columns = vec![
            ColumnDescriptor::new("id", false),
            header_only,
            ColumnDescriptor::new("name", false),
            ColumnDescriptor::new("extra", false),
        ];

        let record = assign_dynamic_row(&columns, &["4", "ignored", "Lin"]);

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["id", "name", "extra"]);
        assert_eq!(record.get("id"), Some(&CellValue::Integer(4)));
        assert_eq!(record.get("extra"), Some(&CellValue::Empty));
    }
}
