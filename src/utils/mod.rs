//! Helpers used across the application:
//!
//! - [`token_generator`] - Random token plaintext generation
//! - [`password`] - bcrypt hashing on the blocking pool
//! - [`client_ip`] - Client address resolution for rate limiting

pub mod client_ip;
pub mod password;
pub mod token_generator;
