//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract consumed by CRM services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories never validate business rules; services do that first.
//! - Storage constraint conflicts surface as `RepoError::UniqueViolation`,
//!   not as opaque transport errors.

pub mod crm_repo;
