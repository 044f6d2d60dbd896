//! Domain layer: entities, validation rules and repository contracts.
//!
//! Nothing in here knows about HTTP or SQL. Repository traits are implemented
//! in [`crate::infrastructure::persistence`] and consumed by the services in
//! [`crate::application::services`].
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`validation`] - Field error accumulator shared by every input
//! - [`filters`] - Pagination and sorting contract for list queries

pub mod entities;
pub mod filters;
pub mod repositories;
pub mod validation;
