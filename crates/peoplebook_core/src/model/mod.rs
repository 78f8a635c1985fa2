//! Domain model types managed by the repository layer.
//!
//! # Responsibility
//! - Define the stored record shapes and their storage bindings.
//!
//! # Invariants
//! - Every model is identified by exactly one key attribute.

pub mod person;
