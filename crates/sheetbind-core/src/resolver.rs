//! Column discovery for static and dynamic shapes

use crate::descriptor::{sort_by_priority, ColumnAttribute, ColumnDescriptor};
use crate::error::{Error, Result};
use crate::record::DynamicRecord;
use crate::shape::{DataShape, Member, MemberKind, ShapeTable};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Produces the ordered column list for a shape
pub trait ColumnResolver {
    fn resolve(
        &self,
        shape: DataShape<'_>,
        sample: Option<&DynamicRecord>,
    ) -> Result<Vec<ColumnDescriptor>>;
}

/// Resolve columns from member tables and annotations.
///
/// Fields are discovered before properties, each in declaration order, and
/// the result is stable-sorted by priority. With `require_attribute` set, a
/// member without an annotation of its own or on the metadata shape yields no
/// column. Dynamic shapes take their columns from the sample's keys.
pub fn resolve_columns(
    shape: DataShape<'_>,
    sample: Option<&DynamicRecord>,
    require_attribute: bool,
) -> Result<Vec<ColumnDescriptor>> {
    let mut columns = match shape {
        DataShape::Static(table) => static_columns(table, require_attribute),
        DataShape::Dynamic => {
            let sample = sample.ok_or(Error::MissingSample)?;
            sample
                .keys()
                .map(|key| ColumnDescriptor::new(key, false))
                .collect()
        }
    };

    sort_by_priority(&mut columns);
    debug!(count = columns.len(), require_attribute, "resolved columns");
    Ok(columns)
}

fn static_columns(table: &ShapeTable, require_attribute: bool) -> Vec<ColumnDescriptor> {
    let fields = table.members_of(MemberKind::Field);
    let properties = table.members_of(MemberKind::Property);

    fields
        .chain(properties)
        .filter_map(|member| member_column(table, member, require_attribute))
        .collect()
}

fn member_column(
    table: &ShapeTable,
    member: &Member,
    require_attribute: bool,
) -> Option<ColumnDescriptor> {
    if !require_attribute {
        return Some(ColumnDescriptor::new(&member.name, member.is_field()));
    }

    let annotation: &ColumnAttribute = member
        .annotation
        .as_ref()
        .or_else(|| table.metadata_annotation(&member.name))?;

    // Kind always comes from the primary shape's member
    Some(annotation.resolve(&member.name, member.is_field()))
}

/// The default resolver: member tables plus annotations
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeColumnResolver {
    /// Only annotated members become columns
    pub require_attribute: bool,
}

impl AttributeColumnResolver {
    pub fn new(require_attribute: bool) -> Self {
        Self { require_attribute }
    }
}

impl ColumnResolver for AttributeColumnResolver {
    fn resolve(
        &self,
        shape: DataShape<'_>,
        sample: Option<&DynamicRecord>,
    ) -> Result<Vec<ColumnDescriptor>> {
        resolve_columns(shape, sample, self.require_attribute)
    }
}

/// A resolver returning a fixed, caller-supplied column list
#[derive(Debug, Clone, Default)]
pub struct ManualColumnResolver {
    columns: Vec<ColumnDescriptor>,
}

impl ManualColumnResolver {
    /// Use descriptors as given, sorted by priority
    pub fn new(mut columns: Vec<ColumnDescriptor>) -> Self {
        sort_by_priority(&mut columns);
        Self { columns }
    }

    /// Resolve a list of annotations. Each needs a `source_name` or `name`,
    /// annotations with neither are dropped.
    pub fn from_attributes(attributes: &[ColumnAttribute]) -> Self {
        let columns = attributes
            .iter()
            .filter_map(|attr| {
                let member = attr.source_name.as_ref().or(attr.name.as_ref())?;
                Some(attr.resolve(member, false))
            })
            .collect();
        Self::new(columns)
    }

    /// Load annotations from a JSON array
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        let attributes: Vec<ColumnAttribute> = serde_json::from_str(&content)?;
        Ok(Self::from_attributes(&attributes))
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }
}

impl ColumnResolver for ManualColumnResolver {
    fn resolve(
        &self,
        _shape: DataShape<'_>,
        _sample: Option<&DynamicRecord>,
    ) -> Result<Vec<ColumnDescriptor>> {
        Ok(self.columns.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{DeclaredType, ValueType};

    const INT: DeclaredType = DeclaredType::Value(ValueType::Integer);
    const TEXT: DeclaredType = DeclaredType::Value(ValueType::String);
    const FLAG: DeclaredType = DeclaredType::Value(ValueType::Bool);

    fn annotated() -> ShapeTable {
        ShapeTable::new("TestModel")
            .property_with("IntProperty", INT, ColumnAttribute::new())
            .property_with("StringProperty", TEXT, ColumnAttribute::new())
            .property("Unmapped", TEXT)
            .field_with("BoolProperty", FLAG, ColumnAttribute::new())
    }

    fn names(columns: &[ColumnDescriptor]) -> Vec<&str> {
        columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_require_attribute_filters_unannotated() {
        let cols = resolve_columns(DataShape::Static(&annotated()), None, true).unwrap();

        assert_eq!(names(&cols), vec!["BoolProperty", "IntProperty", "StringProperty"]);
        assert!(cols[0].source_is_field);
        assert!(!cols[1].source_is_field);
        assert!(!cols[2].source_is_field);
    }

    #[test]
    fn test_metadata_shape_supplies_annotations() {
        let meta = ShapeTable::new("TestModelMeta")
            .property_with("IntProperty", INT, ColumnAttribute::new())
            .property_with("StringProperty", TEXT, ColumnAttribute::new().name("Text"))
            .property_with("BoolProperty", FLAG, ColumnAttribute::new());
        let table = ShapeTable::new("TestModelSimple")
            .property("IntProperty", INT)
            .property("StringProperty", TEXT)
            .field("BoolProperty", FLAG)
            .field("Extra", INT)
            .metadata(meta);

        let cols = resolve_columns(DataShape::Static(&table), None, true).unwrap();

        assert_eq!(names(&cols), vec!["BoolProperty", "IntProperty", "Text"]);
        // The metadata member is a property, the primary member a field
        assert!(cols[0].source_is_field);
        assert_eq!(cols[2].source_name, "StringProperty");
    }

    #[test]
    fn test_own_annotation_wins_over_metadata() {
        let table = ShapeTable::new("M")
            .property_with("A", INT, ColumnAttribute::new().name("Own"))
            .metadata(ShapeTable::new("Meta").property_with(
                "A",
                INT,
                ColumnAttribute::new().name("Meta"),
            ));

        let cols = resolve_columns(DataShape::Static(&table), None, true).unwrap();
        assert_eq!(names(&cols), vec!["Own"]);
    }

    #[test]
    fn test_without_attribute_every_member_is_a_column() {
        let cols = resolve_columns(DataShape::Static(&annotated()), None, false).unwrap();

        assert_eq!(
            names(&cols),
            vec!["BoolProperty", "IntProperty", "StringProperty", "Unmapped"]
        );
        assert!(cols.iter().all(|c| c.has_value && c.name == c.source_name));
        assert!(cols.iter().all(|c| c.column_format.is_none()));
    }

    #[test]
    fn test_priority_sort_is_stable_across_kinds() {
        let table = ShapeTable::new("Report")
            .property_with("ColInt", INT, ColumnAttribute::new().name("Int").priority(1))
            .property_with("ColString", TEXT, ColumnAttribute::new().name("String").priority(3))
            .property_with(
                "ColDate",
                DeclaredType::Value(ValueType::Date),
                ColumnAttribute::new().name("Date").priority(2),
            )
            .property_with("Tail", INT, ColumnAttribute::new().priority(1))
            .field_with("Head", INT, ColumnAttribute::new().priority(1));

        let first = resolve_columns(DataShape::Static(&table), None, true).unwrap();
        let second = resolve_columns(DataShape::Static(&table), None, true).unwrap();

        assert_eq!(names(&first), vec!["Head", "Int", "Tail", "Date", "String"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_dynamic_without_sample_fails() {
        let err = resolve_columns(DataShape::Dynamic, None, false).unwrap_err();
        assert!(matches!(err, Error::MissingSample));
    }

    #[test]
    fn test_dynamic_sample_keys_become_columns() {
        let sample = DynamicRecord::new().with("a", 1i64).with("b", "x");
        let cols = resolve_columns(DataShape::Dynamic, Some(&sample), true).unwrap();

        assert_eq!(names(&cols), vec!["a", "b"]);
        assert!(cols.iter().all(|c| !c.source_is_field));
        assert!(cols.iter().all(|c| c.source_name == c.name));
    }

    #[test]
    fn test_manual_resolver_from_attributes() {
        let resolver = ManualColumnResolver::from_attributes(&[
            ColumnAttribute::new().source_name("name").priority(2),
            ColumnAttribute::new().name("Id").priority(1),
            ColumnAttribute::new(),
        ]);

        let cols = resolver.resolve(DataShape::Dynamic, None).unwrap();
        assert_eq!(names(&cols), vec!["Id", "name"]);
        assert_eq!(cols[0].source_name, "Id");
    }

    #[test]
    fn test_manual_resolver_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("columns.json");
        fs::write(
            &path,
            r#"[{"source_name":"id","name":"Id"},{"source_name":"total","column_format":"0.00"}]"#,
        )
        .unwrap();

        let resolver = ManualColumnResolver::load(&path).unwrap();
        let cols = resolver.columns();
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[1].name, "total");
        assert_eq!(cols[1].column_format.as_deref(), Some("0.00"));
    }
}
