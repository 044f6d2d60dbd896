//! Infrastructure layer for external integrations.
//!
//! Implements the interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`mailer`] - Outgoing email (SMTP and no-op implementations)
//! - [`rate_limiter`] - Per-client token buckets

pub mod mailer;
pub mod persistence;
pub mod rate_limiter;
