//! Generic repository layer: entity contract, scope and persistence façade.
//!
//! # Responsibility
//! - Define the storage-agnostic entity contract used by the generic repository.
//! - Isolate SQLite query construction from service/business orchestration.
//!
//! # Invariants
//! - Ordering field names are validated against entity metadata before any SQL runs.
//! - Absent find results are `Ok(None)`, never an error.
//! - No repository operation retries or swallows a store failure.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod base_repo;
pub mod entity;
pub mod example;
pub mod order;
pub mod scope;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error taxonomy shared by every repository operation.
///
/// One tagged enumeration instead of catch-all wrapping, so callers can
/// distinguish store failures from caller mistakes and every variant keeps
/// its structured cause.
#[derive(Debug)]
pub enum RepoError {
    /// Failure originating from the underlying store.
    Storage(DbError),
    /// Caller-supplied ordering field or page window is malformed.
    /// Raised before the store is touched.
    Validation(String),
    /// Broken entity descriptor or schema mismatch, detected at
    /// repository construction.
    Configuration(String),
    /// Failure inside the example-query family, with the original
    /// cause preserved.
    Query {
        context: String,
        source: Box<RepoError>,
    },
    /// The keyed row does not exist where one is required.
    NotFound {
        entity: &'static str,
        key: String,
    },
    /// A persisted row cannot be decoded into its entity type.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Validation(message) => write!(f, "invalid query input: {message}"),
            Self::Configuration(message) => write!(f, "repository misconfigured: {message}"),
            Self::Query { context, source } => write!(f, "example query failed ({context}): {source}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found for key `{key}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Query { source, .. } => Some(source.as_ref()),
            Self::Validation(_)
            | Self::Configuration(_)
            | Self::NotFound { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}
