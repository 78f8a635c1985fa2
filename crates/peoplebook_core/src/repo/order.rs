//! Ordering and pagination specifications for listing queries.
//!
//! # Responsibility
//! - Turn field names plus a direction flag into an ORDER BY clause.
//! - Validate page windows before they reach the store.
//!
//! # Invariants
//! - Unknown ordering fields fail with `Validation` before query execution,
//!   never silently ignored.
//! - `PageWindow.limit` bounds the row count; `start` is a zero-based offset.

use crate::repo::{RepoError, RepoResult};

/// Sort direction shared by every field of an [`OrderSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn sql_keyword(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Ordered field names with one direction applied to all of them.
///
/// The single shared direction mirrors the contract this layer always had:
/// callers order by several fields but choose ascending or descending once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSpec {
    fields: Vec<String>,
    direction: Direction,
}

impl OrderSpec {
    pub fn new<I, S>(fields: I, direction: Direction) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            direction,
        }
    }

    pub fn ascending<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(fields, Direction::Ascending)
    }

    pub fn descending<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(fields, Direction::Descending)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Rejects field names that are not columns of the bound entity.
    pub(crate) fn validate(&self, columns: &[&'static str]) -> RepoResult<()> {
        for field in &self.fields {
            if !columns.iter().any(|column| *column == field.as_str()) {
                return Err(RepoError::Validation(format!(
                    "unknown ordering field `{field}`"
                )));
            }
        }
        Ok(())
    }

    /// Renders the ORDER BY clause, or an empty string for no fields.
    ///
    /// Must only be called after [`validate`](Self::validate); field names
    /// are interpolated into SQL.
    pub(crate) fn sql_clause(&self) -> String {
        if self.fields.is_empty() {
            return String::new();
        }
        let terms: Vec<String> = self
            .fields
            .iter()
            .map(|field| format!("{field} {}", self.direction.sql_keyword()))
            .collect();
        format!(" ORDER BY {}", terms.join(", "))
    }
}

/// Offset/limit slice of a result set.
///
/// `start` is a zero-based row offset; `limit` is the maximum number of
/// returned rows, not a stop index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: u32,
    pub limit: u32,
}

impl PageWindow {
    pub fn new(start: u32, limit: u32) -> Self {
        Self { start, limit }
    }

    pub(crate) fn validate(&self) -> RepoResult<()> {
        if self.limit == 0 {
            return Err(RepoError::Validation(
                "page window limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, OrderSpec, PageWindow};
    use crate::repo::RepoError;

    const COLUMNS: &[&str] = &["id", "name", "age"];

    #[test]
    fn order_clause_shares_one_direction_across_fields() {
        let spec = OrderSpec::descending(["age", "name"]);
        spec.validate(COLUMNS).expect("fields are known columns");
        assert_eq!(spec.sql_clause(), " ORDER BY age DESC, name DESC");
    }

    #[test]
    fn empty_field_list_renders_no_clause() {
        let spec = OrderSpec::new(Vec::<String>::new(), Direction::Ascending);
        assert_eq!(spec.sql_clause(), "");
    }

    #[test]
    fn unknown_field_is_rejected() {
        let spec = OrderSpec::ascending(["nonexistent_field"]);
        let err = spec.validate(COLUMNS).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[test]
    fn zero_limit_window_is_rejected() {
        let err = PageWindow::new(0, 0).validate().unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        PageWindow::new(3, 1).validate().expect("positive limit is valid");
    }
}
