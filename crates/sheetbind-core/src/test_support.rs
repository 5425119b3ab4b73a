//! Record types shared by unit tests

use crate::descriptor::ColumnAttribute;
use crate::error::{Error, Result};
use crate::shape::{ShapeTable, Tabular};
use crate::value::{CellValue, DeclaredType, ValueType};
use chrono::NaiveDate;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub born: Option<NaiveDate>,
    pub score: Option<i64>,
    pub internal: String,
}

impl Person {
    pub fn new(
        id: i64,
        name: &str,
        active: bool,
        born: Option<NaiveDate>,
        score: Option<i64>,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            active,
            born,
            score,
            internal: String::new(),
        }
    }
}

impl Tabular for Person {
    fn shape() -> ShapeTable {
        ShapeTable::new("Person")
            .field_with(
                "id",
                DeclaredType::Value(ValueType::Integer),
                ColumnAttribute::new().name("Id"),
            )
            .property_with(
                "name",
                DeclaredType::Value(ValueType::String),
                ColumnAttribute::new().name("Name").priority(1),
            )
            .property_with(
                "active",
                DeclaredType::Value(ValueType::Bool),
                ColumnAttribute::new().name("Active").priority(2),
            )
            .property_with(
                "born",
                DeclaredType::Nullable(ValueType::Date),
                ColumnAttribute::new().name("Born").priority(3),
            )
            .property_with(
                "score",
                DeclaredType::Nullable(ValueType::Integer),
                ColumnAttribute::new().name("Score").priority(4),
            )
            .property("internal", DeclaredType::Value(ValueType::String))
    }

    fn read_member(&self, member: &str) -> Option<CellValue> {
        let value: CellValue = match member {
            "id" => self.id.into(),
            "name" => self.name.as_str().into(),
            "active" => self.active.into(),
            "born" => self.born.into(),
            "score" => self.score.into(),
            "internal" => self.internal.as_str().into(),
            _ => return None,
        };
        Some(value)
    }

    fn write_member(&mut self, member: &str, value: CellValue) -> Result<()> {
        match member {
            "id" => self.id = value.into_typed(member)?,
            "name" => self.name = value.into_typed(member)?,
            "active" => self.active = value.into_typed(member)?,
            "born" => self.born = value.into_typed(member)?,
            "score" => self.score = value.into_typed(member)?,
            "internal" => self.internal = value.into_typed(member)?,
            _ => {
                return Err(Error::UnknownMember {
                    member: member.to_string(),
                })
            }
        }
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
