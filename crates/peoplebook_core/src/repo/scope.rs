//! Per-request persistence scope with an explicit synchronization point.
//!
//! # Responsibility
//! - Own the queue of deferred writes executed against one connection.
//! - Provide `flush`/`clear` as the caller-controlled sync points.
//!
//! # Invariants
//! - The scope never opens or closes the connection; teardown belongs to
//!   the owning caller.
//! - `flush` executes queued writes in enqueue order inside one transaction;
//!   on failure the transaction rolls back and the queue is already drained.

use crate::repo::RepoResult;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::cell::RefCell;

struct PendingWrite {
    sql: String,
    params: Vec<Value>,
}

/// Live execution context for repository operations.
///
/// One scope per logical request. A scope is a value the caller passes to
/// each repository it constructs, not shared mutable repository state, so
/// example queries opening their own scope never become visible to another
/// caller.
pub struct Scope<'conn> {
    conn: &'conn Connection,
    pending: RefCell<Vec<PendingWrite>>,
}

impl<'conn> Scope<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Underlying connection, for read statements and derived scopes.
    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    /// Number of writes queued and not yet flushed.
    pub fn pending_writes(&self) -> usize {
        self.pending.borrow().len()
    }

    pub(crate) fn enqueue(&self, sql: String, params: Vec<Value>) {
        self.pending.borrow_mut().push(PendingWrite { sql, params });
    }

    /// Pushes all queued writes to the store synchronously.
    ///
    /// Writes run in enqueue order inside a single transaction. A failed
    /// flush rolls the transaction back and surfaces the store error; the
    /// queue is not replayed.
    pub fn flush(&self) -> RepoResult<()> {
        let queued = self.pending.borrow_mut().split_off(0);
        if queued.is_empty() {
            return Ok(());
        }

        let tx = self.conn.unchecked_transaction()?;
        for write in &queued {
            tx.execute(&write.sql, params_from_iter(write.params.iter()))?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Flushes, then drops everything still tracked by this scope.
    ///
    /// After `clear`, previously queued work is either persisted or gone;
    /// nothing is synchronized implicitly later.
    pub fn clear(&self) -> RepoResult<()> {
        self.flush()?;
        self.pending.borrow_mut().clear();
        Ok(())
    }
}

impl std::fmt::Debug for Scope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("pending_writes", &self.pending_writes())
            .finish()
    }
}
