//! Generic repository façade over one entity/key binding.
//!
//! # Responsibility
//! - Compose entity metadata, ordering, pagination and example matching
//!   into persist/merge/remove/find/list operations.
//! - Keep SQL construction inside the persistence boundary.
//!
//! # Invariants
//! - The entity binding is fixed at construction and never changes.
//! - Write operations synchronize (flush) before returning.
//! - Store failures are logged at the catch site, then re-raised with
//!   their cause attached; nothing is retried.

use crate::repo::entity::{validate_descriptor, Entity};
use crate::repo::example::{build_filter, MatchMode};
use crate::repo::order::{OrderSpec, PageWindow};
use crate::repo::scope::Scope;
use crate::repo::{RepoError, RepoResult};
use log::error;
use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::marker::PhantomData;

/// Generic data-access façade bound to one entity type.
///
/// The repository borrows a caller-owned [`Scope`] for its lifetime; the
/// scope is created once per request and torn down by that caller. Example
/// queries run on a fresh scope derived per call, so no shared state is
/// swapped underneath concurrent users of other repositories.
pub struct Repository<'s, 'conn, E: Entity> {
    scope: &'s Scope<'conn>,
    _entity: PhantomData<E>,
}

impl<E: Entity> std::fmt::Debug for Repository<'_, '_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &E::TABLE)
            .finish_non_exhaustive()
    }
}

impl<'s, 'conn, E: Entity> Repository<'s, 'conn, E> {
    /// Binds the repository to `E` against the given scope.
    ///
    /// Fails with `Configuration` when the entity descriptor is internally
    /// inconsistent or the connection lacks the declared table/columns.
    pub fn try_new(scope: &'s Scope<'conn>) -> RepoResult<Self> {
        validate_descriptor::<E>()?;
        ensure_connection_ready::<E>(scope.connection())?;
        Ok(Self {
            scope,
            _entity: PhantomData,
        })
    }

    /// Inserts a new entity and synchronizes immediately.
    ///
    /// Returns the stored state re-read by key, so store-generated identity
    /// and column defaults are visible on the returned value.
    ///
    /// When the entity's key is absent, the stored row is resolved through
    /// `last_insert_rowid()`. That resolution requires [`Entity::KEY_COLUMN`]
    /// to be declared `INTEGER PRIMARY KEY` (a rowid alias); entities with a
    /// non-rowid key must carry an assigned key into `persist`.
    pub fn persist(&self, entity: &E) -> RepoResult<E> {
        let result = self.persist_inner(entity);
        if let Err(err) = &result {
            log_failure("repo_persist", E::TABLE, err);
        }
        result
    }

    fn persist_inner(&self, entity: &E) -> RepoResult<E> {
        let fields = entity.fields();
        let columns: Vec<&str> = fields.iter().map(|(column, _)| *column).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({});",
            E::TABLE,
            columns.join(", "),
            placeholders
        );
        let binds: Vec<Value> = fields
            .iter()
            .map(|(_, value)| value.bind_value_or_null())
            .collect();

        self.scope.enqueue(sql, binds);
        self.scope.flush()?;

        let stored = match entity.key() {
            Some(key) => self.find(&key)?,
            // Key left absent: the store assigned one; resolve it through
            // the connection's last generated row id.
            None => self.find_by_rowid(self.scope.connection().last_insert_rowid())?,
        };
        stored.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "row persisted into `{}` is not visible after flush",
                E::TABLE
            ))
        })
    }

    /// Attaches/overwrites stored state for a known identity, then
    /// synchronizes. Inserts when the key has no row yet.
    pub fn merge(&self, entity: &E) -> RepoResult<()> {
        let result = self.merge_inner(entity);
        if let Err(err) = &result {
            log_failure("repo_merge", E::TABLE, err);
        }
        result
    }

    fn merge_inner(&self, entity: &E) -> RepoResult<()> {
        if entity.key().is_none() {
            return Err(RepoError::Validation(format!(
                "merge into `{}` requires an already-assigned key",
                E::TABLE
            )));
        }

        let fields = entity.fields();
        let columns: Vec<&str> = fields.iter().map(|(column, _)| *column).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let assignments: Vec<String> = columns
            .iter()
            .filter(|column| **column != E::KEY_COLUMN)
            .map(|column| format!("{column} = excluded.{column}"))
            .collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) DO UPDATE SET {};",
            E::TABLE,
            columns.join(", "),
            placeholders,
            E::KEY_COLUMN,
            assignments.join(", ")
        );
        let binds: Vec<Value> = fields
            .iter()
            .map(|(_, value)| value.bind_value_or_null())
            .collect();

        self.scope.enqueue(sql, binds);
        self.scope.flush()
    }

    /// Deletes the entity stored under `key`, then synchronizes.
    ///
    /// A missing key is a clean `NotFound`; the delete never reaches the
    /// store in that case.
    pub fn remove(&self, key: &E::Key) -> RepoResult<()> {
        let result = self.remove_inner(key);
        if let Err(err) = &result {
            log_failure("repo_remove", E::TABLE, err);
        }
        result
    }

    fn remove_inner(&self, key: &E::Key) -> RepoResult<()> {
        if self.find(key)?.is_none() {
            return Err(RepoError::NotFound {
                entity: E::TABLE,
                key: key.to_string(),
            });
        }

        let sql = format!("DELETE FROM {} WHERE {} = ?;", E::TABLE, E::KEY_COLUMN);
        self.scope.enqueue(sql, vec![key_to_value(key)?]);
        self.scope.flush()
    }

    /// Returns the entity stored under `key`, or `None` when no row matches.
    pub fn find(&self, key: &E::Key) -> RepoResult<Option<E>> {
        let sql = format!("{} WHERE {} = ?;", select_sql::<E>(), E::KEY_COLUMN);
        let result = self.query_single(&sql, &[key_to_value(key)?]);
        if let Err(err) = &result {
            log_failure("repo_find", E::TABLE, err);
        }
        result
    }

    fn find_by_rowid(&self, rowid: i64) -> RepoResult<Option<E>> {
        let sql = format!("{} WHERE rowid = ?;", select_sql::<E>());
        self.query_single(&sql, &[Value::Integer(rowid)])
    }

    /// Returns every stored entity, order unspecified.
    pub fn find_all(&self) -> RepoResult<Vec<E>> {
        self.list(None, None)
    }

    /// Returns every stored entity, sorted per `ordering`.
    pub fn find_all_ordered(&self, ordering: &OrderSpec) -> RepoResult<Vec<E>> {
        self.list(Some(ordering), None)
    }

    /// Returns one offset/limit slice of the stored entities.
    pub fn find_all_page(&self, window: PageWindow) -> RepoResult<Vec<E>> {
        self.list(None, Some(window))
    }

    /// Returns one slice of the stored entities, sorted per `ordering`.
    pub fn find_all_page_ordered(
        &self,
        window: PageWindow,
        ordering: &OrderSpec,
    ) -> RepoResult<Vec<E>> {
        self.list(Some(ordering), Some(window))
    }

    fn list(&self, ordering: Option<&OrderSpec>, window: Option<PageWindow>) -> RepoResult<Vec<E>> {
        // Input validation happens before any SQL executes.
        if let Some(spec) = ordering {
            spec.validate(E::COLUMNS)?;
        }
        if let Some(window) = window {
            window.validate()?;
        }

        let mut sql = select_sql::<E>();
        let mut binds: Vec<Value> = Vec::new();
        if let Some(spec) = ordering {
            sql.push_str(&spec.sql_clause());
        }
        if let Some(window) = window {
            sql.push_str(" LIMIT ? OFFSET ?");
            binds.push(Value::Integer(i64::from(window.limit)));
            binds.push(Value::Integer(i64::from(window.start)));
        }
        sql.push(';');

        let result = self.query_rows(self.scope.connection(), &sql, &binds);
        if let Err(err) = &result {
            log_failure("repo_find_all", E::TABLE, err);
        }
        result
    }

    /// Lists entities matching the template's populated attributes, with
    /// substring matching `Anywhere` for text attributes.
    pub fn find_by_example(&self, template: &E, ignore_case: bool) -> RepoResult<Vec<E>> {
        self.example_query(template, MatchMode::Anywhere, ignore_case, None)
    }

    /// Lists entities matching the template under an explicit match policy.
    pub fn find_by_example_with_mode(
        &self,
        template: &E,
        mode: MatchMode,
        ignore_case: bool,
    ) -> RepoResult<Vec<E>> {
        self.example_query(template, mode, ignore_case, None)
    }

    /// Lists entities matching the template, sorted per `ordering`.
    pub fn find_by_example_ordered(
        &self,
        template: &E,
        mode: MatchMode,
        ordering: &OrderSpec,
    ) -> RepoResult<Vec<E>> {
        self.example_query(template, mode, false, Some(ordering))
    }

    fn example_query(
        &self,
        template: &E,
        mode: MatchMode,
        ignore_case: bool,
        ordering: Option<&OrderSpec>,
    ) -> RepoResult<Vec<E>> {
        // Example queries run on a scope of their own, derived per call
        // from the same connection. Nothing shared is mutated.
        let local_scope = Scope::new(self.scope.connection());

        let result = (|| -> RepoResult<Vec<E>> {
            if let Some(spec) = ordering {
                spec.validate(E::COLUMNS)?;
            }

            let filter = build_filter(&template.fields(), mode, ignore_case);
            let mut sql = select_sql::<E>();
            sql.push_str(&filter.sql_clause());
            if let Some(spec) = ordering {
                sql.push_str(&spec.sql_clause());
            }
            sql.push(';');

            self.query_rows(local_scope.connection(), &sql, &filter.into_binds())
        })();

        result.map_err(|err| {
            let wrapped = RepoError::Query {
                context: format!("table={} mode={mode:?} ignore_case={ignore_case}", E::TABLE),
                source: Box::new(err),
            };
            log_failure("repo_find_by_example", E::TABLE, &wrapped);
            wrapped
        })
    }

    /// Reloads the entity's state from the store, discarding unsynchronized
    /// in-memory mutation on it.
    pub fn refresh(&self, entity: &mut E) -> RepoResult<()> {
        let result = self.refresh_inner(entity);
        if let Err(err) = &result {
            log_failure("repo_refresh", E::TABLE, err);
        }
        result
    }

    fn refresh_inner(&self, entity: &mut E) -> RepoResult<()> {
        let key = entity.key().ok_or_else(|| {
            RepoError::Validation(format!(
                "refresh of `{}` requires an already-assigned key",
                E::TABLE
            ))
        })?;
        match self.find(&key)? {
            Some(stored) => {
                *entity = stored;
                Ok(())
            }
            None => Err(RepoError::NotFound {
                entity: E::TABLE,
                key: key.to_string(),
            }),
        }
    }

    /// Pushes pending scope writes to the store synchronously.
    pub fn flush(&self) -> RepoResult<()> {
        self.scope.flush()
    }

    /// Flushes, then detaches everything tracked by the scope.
    pub fn clear(&self) -> RepoResult<()> {
        self.scope.clear()
    }

    fn query_single(&self, sql: &str, binds: &[Value]) -> RepoResult<Option<E>> {
        let mut stmt = self.scope.connection().prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(binds.iter()))?;
        match rows.next()? {
            Some(row) => Ok(Some(E::from_row(row)?)),
            None => Ok(None),
        }
    }

    fn query_rows(&self, conn: &Connection, sql: &str, binds: &[Value]) -> RepoResult<Vec<E>> {
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(params_from_iter(binds.iter()))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(E::from_row(row)?);
        }
        Ok(entities)
    }
}

fn select_sql<E: Entity>() -> String {
    format!("SELECT {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
}

fn key_to_value<K: ToSql>(key: &K) -> RepoResult<Value> {
    match key.to_sql()? {
        ToSqlOutput::Borrowed(value_ref) => Ok(value_ref.into()),
        ToSqlOutput::Owned(value) => Ok(value),
        other => Err(RepoError::InvalidData(format!(
            "unsupported key binding `{other:?}`"
        ))),
    }
}

fn log_failure(event: &str, table: &str, err: &RepoError) {
    error!("event={event} module=repo status=error table={table} error={err}");
}

fn ensure_connection_ready<E: Entity>(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, E::TABLE)? {
        return Err(RepoError::Configuration(format!(
            "required table `{}` is missing; connection is not migrated",
            E::TABLE
        )));
    }
    for column in E::COLUMNS {
        if !table_has_column(conn, E::TABLE, column)? {
            return Err(RepoError::Configuration(format!(
                "table `{}` is missing required column `{column}`",
                E::TABLE
            )));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
