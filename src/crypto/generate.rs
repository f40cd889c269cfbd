//! Random password generation.
//!
//! Passwords are drawn from printable ASCII (`!` through `~`) and must
//! contain at least one uppercase letter, lowercase letter, digit and
//! symbol.  Candidates that miss a class are discarded and redrawn.

use rand::Rng;

use crate::errors::{PassVaultError, Result};

/// Default generated password length.
pub const DEFAULT_LENGTH: usize = 20;

/// Shortest length that can satisfy the policy with some margin.
pub const MIN_LENGTH: usize = 8;

/// Longest length we accept.
pub const MAX_LENGTH: usize = 1024;

const FIRST_PRINTABLE: u8 = b'!';
const LAST_PRINTABLE: u8 = b'~';

/// Generate a random password of `length` characters.
pub fn generate_password(length: usize) -> Result<String> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(PassVaultError::CommandFailed(format!(
            "password length must be between {MIN_LENGTH} and {MAX_LENGTH} (got {length})"
        )));
    }

    let mut rng = rand::rng();
    loop {
        let candidate: String = (0..length)
            .map(|_| char::from(rng.random_range(FIRST_PRINTABLE..=LAST_PRINTABLE)))
            .collect();

        if meets_policy(&candidate) {
            return Ok(candidate);
        }
    }
}

/// `true` if `password` has every required character class.
pub fn meets_policy(password: &str) -> bool {
    let bytes = password.as_bytes();
    bytes.iter().any(u8::is_ascii_uppercase)
        && bytes.iter().any(u8::is_ascii_lowercase)
        && bytes.iter().any(u8::is_ascii_digit)
        && bytes.iter().any(u8::is_ascii_punctuation)
}
