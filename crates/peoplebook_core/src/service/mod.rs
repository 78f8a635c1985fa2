//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep outer surfaces (HTTP, FFI) decoupled from storage details.

pub mod person_service;
