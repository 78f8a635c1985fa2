//! Person use-case service.
//!
//! # Responsibility
//! - Provide stable pass-through entry points for outer callers.
//! - Delegate all persistence to the generic repository.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - `list_all` is the sole data source of the JSON read surface.

use crate::model::person::{Person, PersonId};
use crate::repo::base_repo::Repository;
use crate::repo::scope::Scope;
use crate::repo::RepoResult;

/// Use-case service wrapper around the person repository.
pub struct PersonService<'s, 'conn> {
    repo: Repository<'s, 'conn, Person>,
}

impl<'s, 'conn> PersonService<'s, 'conn> {
    /// Creates a service bound to the caller's request scope.
    pub fn try_new(scope: &'s Scope<'conn>) -> RepoResult<Self> {
        Ok(Self {
            repo: Repository::try_new(scope)?,
        })
    }

    /// Returns every registered person, order unspecified.
    pub fn list_all(&self) -> RepoResult<Vec<Person>> {
        self.repo.find_all()
    }

    /// Registers a new person and returns the stored state.
    pub fn register(&self, person: &Person) -> RepoResult<Person> {
        self.repo.persist(person)
    }

    /// Overwrites the stored state of a known person.
    pub fn update(&self, person: &Person) -> RepoResult<()> {
        self.repo.merge(person)
    }

    /// Removes a person by id.
    pub fn unregister(&self, id: PersonId) -> RepoResult<()> {
        self.repo.remove(&id)
    }

    /// Gets one person by id.
    pub fn get(&self, id: PersonId) -> RepoResult<Option<Person>> {
        self.repo.find(&id)
    }

    /// Lists people matching the template's populated attributes.
    pub fn search(&self, template: &Person, ignore_case: bool) -> RepoResult<Vec<Person>> {
        self.repo.find_by_example(template, ignore_case)
    }
}
