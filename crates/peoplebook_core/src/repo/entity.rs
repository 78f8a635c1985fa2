//! Entity contract binding a record type to its stored shape.
//!
//! # Responsibility
//! - Declare table/column metadata once per entity type, at compile time.
//! - Bridge entity attributes to SQL values for inserts and example matching.
//!
//! # Invariants
//! - `KEY_COLUMN` must be listed in `COLUMNS`; violations fail repository
//!   construction, never query execution.
//! - `fields()` returns one value per column, in `COLUMNS` order.

use crate::repo::{RepoError, RepoResult};
use rusqlite::types::{FromSql, ToSql, Value};
use rusqlite::Row;
use std::fmt::Display;

/// One entity attribute as seen by the repository.
///
/// `Absent` marks an unset/default attribute: it binds as SQL NULL on
/// insert and never produces an example-query predicate. Only `Text`
/// participates in substring matching; every other populated variant is
/// matched by equality.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Absent,
    Integer(i64),
    Real(f64),
    Text(String),
    Character(char),
}

impl FieldValue {
    /// Converts to a bindable SQL value, or `None` when absent.
    pub(crate) fn bind_value(&self) -> Option<Value> {
        match self {
            Self::Absent => None,
            Self::Integer(value) => Some(Value::Integer(*value)),
            Self::Real(value) => Some(Value::Real(*value)),
            Self::Text(value) => Some(Value::Text(value.clone())),
            Self::Character(value) => Some(Value::Text(value.to_string())),
        }
    }

    /// Converts to a bindable SQL value, mapping `Absent` to NULL.
    pub(crate) fn bind_value_or_null(&self) -> Value {
        self.bind_value().unwrap_or(Value::Null)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Storage contract for one entity type.
///
/// This trait is the explicit type witness the repository is bound to:
/// the implementor states its table, key and column set directly, so
/// the binding is resolved at compile time and is immutable for the
/// repository's lifetime.
pub trait Entity: Sized {
    /// Primary key type. Must identify at most one stored row.
    type Key: ToSql + FromSql + Display;

    /// Table holding this entity type.
    const TABLE: &'static str;
    /// Column storing the identity attribute.
    const KEY_COLUMN: &'static str;
    /// Full column set, including the key column.
    const COLUMNS: &'static [&'static str];

    /// Returns the identity value, or `None` when not yet assigned.
    fn key(&self) -> Option<Self::Key>;

    /// Returns `(column, value)` pairs for every column, in `COLUMNS` order.
    fn fields(&self) -> Vec<(&'static str, FieldValue)>;

    /// Decodes one stored row into an entity value.
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

/// Checks the compile-time descriptor of `E` for internal consistency.
///
/// Guards the contract the reflective original never enforced: an entity
/// that fails to declare a usable binding is rejected at construction
/// instead of misbehaving at query time.
pub(crate) fn validate_descriptor<E: Entity>() -> RepoResult<()> {
    if E::TABLE.trim().is_empty() {
        return Err(RepoError::Configuration(
            "entity declares an empty table name".to_string(),
        ));
    }
    if E::COLUMNS.is_empty() {
        return Err(RepoError::Configuration(format!(
            "entity table `{}` declares no columns",
            E::TABLE
        )));
    }
    if !E::COLUMNS.contains(&E::KEY_COLUMN) {
        return Err(RepoError::Configuration(format!(
            "key column `{}` is not part of the declared columns of `{}`",
            E::KEY_COLUMN,
            E::TABLE
        )));
    }
    Ok(())
}
