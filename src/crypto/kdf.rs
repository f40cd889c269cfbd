//! Password-based key derivation using Argon2id.
//!
//! The master password feeds Argon2id twice, with independent salts:
//!
//! - [`derive_verifier`] produces a PHC hash string (salt and cost
//!   parameters embedded) that authenticates future unlock attempts.
//! - [`derive_key`] produces the raw 32-byte wrap key that seals the
//!   master private key.  Its salt and parameters ([`WrapKdf`]) are
//!   chosen once at `init` and stay fixed for the life of the vault.
//!
//! The verifier string is never used as key material.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use zeroize::Zeroize;

use super::keys::{SecretKey, KEY_LEN};
use crate::errors::{PassVaultError, Result};

/// Length of the salts we generate (128 bits).
pub const SALT_LEN: usize = 16;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Configurable Argon2id parameters.
///
/// These map 1:1 to the fields in `Settings` so `init` can use
/// whatever the user configured in `settings.toml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// Reject dangerously weak settings before any hashing happens.
    pub fn validate(&self) -> Result<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(PassVaultError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if self.iterations < 1 {
            return Err(PassVaultError::KeyDerivationFailed(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if self.parallelism < 1 {
            return Err(PassVaultError::KeyDerivationFailed(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }

    fn hasher(&self, output_len: Option<usize>) -> Result<Argon2<'static>> {
        self.validate()?;
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, output_len)
            .map_err(|e| {
                PassVaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}"))
            })?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Salt and cost parameters for the wrap-key derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapKdf {
    pub salt: [u8; SALT_LEN],
    pub params: Argon2Params,
}

impl WrapKdf {
    /// Pick a fresh random salt for a new vault.
    pub fn generate(params: Argon2Params) -> Self {
        Self {
            salt: random_salt(),
            params,
        }
    }
}

/// Hash `password` into a self-describing Argon2id PHC string.
pub fn derive_verifier(password: &[u8], params: &Argon2Params) -> Result<String> {
    let argon2 = params.hasher(None)?;
    let salt = SaltString::encode_b64(&random_salt())
        .map_err(|e| PassVaultError::KeyDerivationFailed(format!("salt encoding failed: {e}")))?;

    let hash = argon2
        .hash_password(password, &salt)
        .map_err(|e| PassVaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(hash.to_string())
}

/// Derive the 32-byte wrap key from `password` under the vault's fixed
/// salt and parameters.
///
/// The same password + `WrapKdf` always produces the same key.
pub fn derive_key(password: &[u8], kdf: &WrapKdf) -> Result<SecretKey> {
    let argon2 = kdf.params.hasher(Some(KEY_LEN))?;

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, &kdf.salt, &mut key)
        .map_err(|e| PassVaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    let secret = SecretKey::new(key);
    key.zeroize();
    Ok(secret)
}

/// Check `password` against a stored verifier.
///
/// A mismatch is `Ok(false)`; only a malformed verifier or a hashing
/// failure is an error.  The comparison is constant-time.
pub fn verify(password: &[u8], verifier: &str) -> Result<bool> {
    let parsed = PasswordHash::new(verifier).map_err(|e| {
        PassVaultError::KeyDerivationFailed(format!("malformed password verifier: {e}"))
    })?;

    match Argon2::default().verify_password(password, &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PassVaultError::KeyDerivationFailed(format!(
            "password verification failed: {e}"
        ))),
    }
}

fn random_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
