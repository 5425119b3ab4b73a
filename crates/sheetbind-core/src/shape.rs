//! Member tables describing static record shapes
//!
//! A static record type registers its members once through [`ShapeTable`]
//! and exposes read/write access by member name through [`Tabular`]. The
//! resolver and accessor work only against these two seams.

use crate::descriptor::ColumnAttribute;
use crate::error::Result;
use crate::value::{CellValue, DeclaredType};
use serde::{Deserialize, Serialize};

/// Whether a member is a raw field or an accessor-backed property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    Field,
    Property,
}

/// One member of a static shape
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Member identifier
    pub name: String,
    /// Field or property
    pub kind: MemberKind,
    /// Declared value type
    pub declared: DeclaredType,
    /// Column annotation, if any
    pub annotation: Option<ColumnAttribute>,
}

impl Member {
    pub fn is_field(&self) -> bool {
        self.kind == MemberKind::Field
    }
}

/// Registered member table for a static record type
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeTable {
    /// Shape name, used in diagnostics
    pub name: String,
    /// Members in declaration order
    pub members: Vec<Member>,
    /// Secondary shape supplying annotations the primary lacks
    pub metadata: Option<Box<ShapeTable>>,
}

impl ShapeTable {
    /// Start an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            metadata: None,
        }
    }

    fn push(
        mut self,
        name: &str,
        kind: MemberKind,
        declared: DeclaredType,
        annotation: Option<ColumnAttribute>,
    ) -> Self {
        self.members.push(Member {
            name: name.to_string(),
            kind,
            declared,
            annotation,
        });
        self
    }

    /// Add an unannotated field
    pub fn field(self, name: &str, declared: DeclaredType) -> Self {
        self.push(name, MemberKind::Field, declared, None)
    }

    /// Add an annotated field
    pub fn field_with(
        self,
        name: &str,
        declared: DeclaredType,
        annotation: ColumnAttribute,
    ) -> Self {
        self.push(name, MemberKind::Field, declared, Some(annotation))
    }

    /// Add an unannotated property
    pub fn property(self, name: &str, declared: DeclaredType) -> Self {
        self.push(name, MemberKind::Property, declared, None)
    }

    /// Add an annotated property
    pub fn property_with(
        self,
        name: &str,
        declared: DeclaredType,
        annotation: ColumnAttribute,
    ) -> Self {
        self.push(name, MemberKind::Property, declared, Some(annotation))
    }

    /// Attach a metadata shape
    pub fn metadata(mut self, metadata: ShapeTable) -> Self {
        self.metadata = Some(Box::new(metadata));
        self
    }

    /// Members of the given kind, in declaration order
    pub fn members_of(&self, kind: MemberKind) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(move |m| m.kind == kind)
    }

    /// Find a member by name and kind
    pub fn member(&self, name: &str, kind: MemberKind) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name && m.kind == kind)
    }

    /// Find a member by name, preferring one of the given kind
    pub fn member_like(&self, name: &str, kind: MemberKind) -> Option<&Member> {
        self.member(name, kind)
            .or_else(|| self.members.iter().find(|m| m.name == name))
    }

    /// The annotation of a same-named member on the metadata shape
    pub fn metadata_annotation(&self, name: &str) -> Option<&ColumnAttribute> {
        self.metadata
            .as_ref()?
            .members
            .iter()
            .find(|m| m.name == name)
            .and_then(|m| m.annotation.as_ref())
    }
}

/// The shape handed to column resolution
#[derive(Debug, Clone, Copy)]
pub enum DataShape<'a> {
    /// A registered static shape
    Static(&'a ShapeTable),
    /// A schema-less shape discovered from a sample record
    Dynamic,
}

/// A static record type with a registered member table
pub trait Tabular {
    /// The member table of this type
    fn shape() -> ShapeTable
    where
        Self: Sized;

    /// Read a member by name, `None` if the type has no such member
    fn read_member(&self, member: &str) -> Option<CellValue>;

    /// Assign a member by name
    fn write_member(&mut self, member: &str, value: CellValue) -> Result<()>;
}
