//! Person domain model and its storage binding.
//!
//! # Responsibility
//! - Define the person record returned by the read surface as JSON.
//! - Declare the `people` table binding used by the generic repository.
//!
//! # Invariants
//! - `id` uniquely identifies at most one stored person.
//! - Every attribute is optional so a `Person::default()` is the empty
//!   query-by-example template.

use crate::repo::entity::{Entity, FieldValue};
use crate::repo::{RepoError, RepoResult};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Stable identifier for a stored person.
pub type PersonId = i64;

/// One person record.
///
/// All attributes are optional: a value left at `None` is simply not
/// stored (bound as NULL) and never participates in example matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Caller-assigned identity, or `None` before first persist.
    pub id: Option<PersonId>,
    pub name: Option<String>,
    pub age: Option<i64>,
    /// Single-character sex code.
    pub sex: Option<char>,
}

impl Person {
    pub fn new(id: PersonId, name: impl Into<String>, age: i64, sex: char) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
            age: Some(age),
            sex: Some(sex),
        }
    }
}

impl Entity for Person {
    type Key = PersonId;

    const TABLE: &'static str = "people";
    const KEY_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["id", "name", "age", "sex"];

    fn key(&self) -> Option<PersonId> {
        self.id
    }

    fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("id", self.id.map_or(FieldValue::Absent, FieldValue::Integer)),
            (
                "name",
                self.name
                    .clone()
                    .map_or(FieldValue::Absent, FieldValue::Text),
            ),
            (
                "age",
                self.age.map_or(FieldValue::Absent, FieldValue::Integer),
            ),
            (
                "sex",
                self.sex.map_or(FieldValue::Absent, FieldValue::Character),
            ),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let sex = match row.get::<_, Option<String>>("sex")? {
            Some(code) => Some(parse_sex_code(&code)?),
            None => None,
        };
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            age: row.get("age")?,
            sex,
        })
    }
}

fn parse_sex_code(code: &str) -> RepoResult<char> {
    let mut chars = code.chars();
    match (chars.next(), chars.next()) {
        (Some(value), None) => Ok(value),
        _ => Err(RepoError::InvalidData(format!(
            "invalid sex code `{code}` in people.sex; expected a single character"
        ))),
    }
}
