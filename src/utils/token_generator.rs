//! Random bearer token generation.
//!
//! Produces the plaintext half of a token from OS entropy. Hashing and
//! persistence live in [`crate::application::services::TokenService`].

use crate::domain::entities::token::PLAINTEXT_LEN;
use crate::error::AppError;
use base32::Alphabet;

/// Number of random bytes behind every token.
const TOKEN_BYTES: usize = 16;

/// Generates a random token plaintext.
///
/// Reads 16 bytes from the system CSPRNG via `getrandom` and encodes them as
/// unpadded RFC 4648 base32, which always yields 26 characters.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random number generator fails.
pub fn generate_plaintext() -> Result<String, AppError> {
    let mut buffer = [0u8; TOKEN_BYTES];

    getrandom::fill(&mut buffer)
        .map_err(|e| AppError::internal(format!("random source unavailable: {e}")))?;

    let plaintext = base32::encode(Alphabet::Rfc4648 { padding: false }, &buffer);
    debug_assert_eq!(plaintext.len(), PLAINTEXT_LEN);

    Ok(plaintext)
}
