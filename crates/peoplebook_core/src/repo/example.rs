//! Query-by-example predicate construction.
//!
//! # Responsibility
//! - Turn the populated attributes of a template entity into WHERE predicates.
//! - Apply substring match policy to text attributes only.
//!
//! # Invariants
//! - Absent attributes never produce predicates; an all-default template
//!   matches every stored row (documented behavior, not a bug).
//! - All predicates are conjoined with AND.
//! - LIKE needles are escaped so `%`, `_` and the escape character match
//!   literally.
//! - Case folding is Unicode-aware on both sides: the needle through
//!   `str::to_lowercase` and the column through the [`crate::db::FOLD_LOWER_FN`]
//!   SQL function installed at connection open.

use crate::db::FOLD_LOWER_FN;
use crate::repo::entity::FieldValue;
use rusqlite::types::Value;

const LIKE_ESCAPE: char = '\\';

/// Substring policy for text attributes of an example template.
///
/// Non-text attributes are matched by equality regardless of mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Equality on the full value.
    Exact,
    /// Value contains the template text.
    Anywhere,
    /// Value starts with the template text.
    Start,
    /// Value ends with the template text.
    End,
}

/// WHERE fragment plus its bind values, ready to append to a SELECT.
#[derive(Debug, Default)]
pub(crate) struct ExampleFilter {
    clauses: Vec<String>,
    binds: Vec<Value>,
}

impl ExampleFilter {
    pub(crate) fn sql_clause(&self) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }
        format!(" WHERE {}", self.clauses.join(" AND "))
    }

    pub(crate) fn into_binds(self) -> Vec<Value> {
        self.binds
    }

    pub(crate) fn predicate_count(&self) -> usize {
        self.clauses.len()
    }
}

/// Builds the conjunction of predicates for the template's populated fields.
pub(crate) fn build_filter(
    fields: &[(&'static str, FieldValue)],
    mode: MatchMode,
    ignore_case: bool,
) -> ExampleFilter {
    let mut filter = ExampleFilter::default();

    for (column, value) in fields {
        match value {
            FieldValue::Absent => {}
            FieldValue::Text(text) => push_text_predicate(&mut filter, column, text, mode, ignore_case),
            other => {
                filter.clauses.push(format!("{column} = ?"));
                filter.binds.push(other.bind_value_or_null());
            }
        }
    }

    filter
}

fn push_text_predicate(
    filter: &mut ExampleFilter,
    column: &str,
    text: &str,
    mode: MatchMode,
    ignore_case: bool,
) {
    let needle = if ignore_case {
        text.to_lowercase()
    } else {
        text.to_string()
    };
    let lhs = if ignore_case {
        format!("{FOLD_LOWER_FN}({column})")
    } else {
        column.to_string()
    };

    match mode {
        MatchMode::Exact => {
            filter.clauses.push(format!("{lhs} = ?"));
            filter.binds.push(Value::Text(needle));
        }
        MatchMode::Anywhere | MatchMode::Start | MatchMode::End => {
            let escaped = escape_like_needle(&needle);
            let pattern = match mode {
                MatchMode::Start => format!("{escaped}%"),
                MatchMode::End => format!("%{escaped}"),
                _ => format!("%{escaped}%"),
            };
            filter
                .clauses
                .push(format!("{lhs} LIKE ? ESCAPE '{LIKE_ESCAPE}'"));
            filter.binds.push(Value::Text(pattern));
        }
    }
}

fn escape_like_needle(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for ch in needle.chars() {
        if ch == '%' || ch == '_' || ch == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{build_filter, escape_like_needle, MatchMode};
    use crate::repo::entity::FieldValue;
    use rusqlite::types::Value;

    #[test]
    fn all_default_template_yields_no_predicates() {
        let fields = vec![
            ("id", FieldValue::Absent),
            ("name", FieldValue::Absent),
        ];
        let filter = build_filter(&fields, MatchMode::Anywhere, true);
        assert_eq!(filter.predicate_count(), 0);
        assert_eq!(filter.sql_clause(), "");
    }

    #[test]
    fn text_fields_use_like_and_non_text_use_equality() {
        let fields = vec![
            ("name", FieldValue::Text("ana".to_string())),
            ("age", FieldValue::Integer(30)),
        ];
        let filter = build_filter(&fields, MatchMode::Anywhere, false);
        assert_eq!(
            filter.sql_clause(),
            " WHERE name LIKE ? ESCAPE '\\' AND age = ?"
        );
        assert_eq!(
            filter.into_binds(),
            vec![Value::Text("%ana%".to_string()), Value::Integer(30)]
        );
    }

    #[test]
    fn ignore_case_folds_column_and_needle() {
        let fields = vec![("name", FieldValue::Text("Ana".to_string()))];
        let filter = build_filter(&fields, MatchMode::Start, true);
        assert_eq!(
            filter.sql_clause(),
            " WHERE ulower(name) LIKE ? ESCAPE '\\'"
        );
        assert_eq!(filter.into_binds(), vec![Value::Text("ana%".to_string())]);
    }

    #[test]
    fn ignore_case_folds_non_ascii_needles() {
        let fields = vec![("name", FieldValue::Text("JOSÉ".to_string()))];
        let filter = build_filter(&fields, MatchMode::Anywhere, true);
        assert_eq!(filter.into_binds(), vec![Value::Text("%josé%".to_string())]);
    }

    #[test]
    fn exact_mode_is_plain_equality() {
        let fields = vec![("name", FieldValue::Text("Ana".to_string()))];
        let filter = build_filter(&fields, MatchMode::Exact, false);
        assert_eq!(filter.sql_clause(), " WHERE name = ?");
        assert_eq!(filter.into_binds(), vec![Value::Text("Ana".to_string())]);
    }

    #[test]
    fn like_wildcards_in_needle_are_escaped() {
        assert_eq!(escape_like_needle("50%_done\\"), "50\\%\\_done\\\\");
    }
}
