//! Core persistence and domain logic for Peoplebook.
//!
//! The centerpiece is the generic repository in [`repo`]: a data-access
//! façade bound to one entity/key pair through the [`Entity`] contract,
//! providing persist/merge/remove/find, ordered and paginated listing,
//! and query-by-example filtering over a synchronous SQLite store.

pub mod dates;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::person::{Person, PersonId};
pub use repo::base_repo::Repository;
pub use repo::entity::{Entity, FieldValue};
pub use repo::example::MatchMode;
pub use repo::order::{Direction, OrderSpec, PageWindow};
pub use repo::scope::Scope;
pub use repo::{RepoError, RepoResult};
pub use service::person_service::PersonService;
