//! The per-vault master config (`master.json`).
//!
//! Written once by `init` and read by every later command.  Holds the
//! master public key in the clear, the master private key sealed under
//! the password-derived wrap key, the password verifier, and the salt
//! and cost parameters needed to re-derive the wrap key.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::{b64, b64_key, write_atomic};
use crate::crypto::kdf::{Argon2Params, WrapKdf, SALT_LEN};
use crate::crypto::PublicKeyBytes;
use crate::errors::{PassVaultError, Result};

/// Current master config format version.
pub const CURRENT_VERSION: u8 = 1;

/// Wrap-key KDF settings as stored in `master.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredWrapKdf {
    #[serde(with = "b64")]
    pub salt: Vec<u8>,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl From<&WrapKdf> for StoredWrapKdf {
    fn from(kdf: &WrapKdf) -> Self {
        Self {
            salt: kdf.salt.to_vec(),
            memory_kib: kdf.params.memory_kib,
            iterations: kdf.params.iterations,
            parallelism: kdf.params.parallelism,
        }
    }
}

impl StoredWrapKdf {
    /// Convert back into crypto-layer params, checking the salt length.
    pub fn to_wrap_kdf(&self) -> Result<WrapKdf> {
        let salt = <[u8; SALT_LEN]>::try_from(self.salt.as_slice()).map_err(|_| {
            PassVaultError::InvalidVaultFormat(format!(
                "wrap salt must be {SALT_LEN} bytes, got {}",
                self.salt.len()
            ))
        })?;
        Ok(WrapKdf {
            salt,
            params: Argon2Params {
                memory_kib: self.memory_kib,
                iterations: self.iterations,
                parallelism: self.parallelism,
            },
        })
    }
}

/// Everything needed to unlock the vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Format version.
    pub version: u8,

    /// X25519 public key every entry is sealed to.
    #[serde(with = "b64_key")]
    pub master_public_key: PublicKeyBytes,

    /// Envelope output wrapping the 32-byte master private key.
    #[serde(with = "b64")]
    pub master_private_key_sealed: Vec<u8>,

    /// Argon2id PHC string used only to authenticate the password.
    pub password_verifier: String,

    /// Salt and params for deriving the wrap key.
    pub wrap_kdf: StoredWrapKdf,

    /// When this vault was initialized.
    pub created_at: DateTime<Utc>,
}

impl MasterConfig {
    /// Read and parse `master.json`.
    ///
    /// A missing file means the vault was never initialized.
    pub fn load(path: &Path) -> Result<Self> {
        let root = path.parent().unwrap_or(Path::new("."));
        if !path.exists() {
            return Err(PassVaultError::NotInitialized(root.to_path_buf()));
        }

        let data = fs::read(path)?;
        let config: MasterConfig = serde_json::from_slice(&data)
            .map_err(|e| PassVaultError::InvalidVaultFormat(format!("master config: {e}")))?;

        if config.version != CURRENT_VERSION {
            return Err(PassVaultError::InvalidVaultFormat(format!(
                "unsupported master config version {}, expected {CURRENT_VERSION}",
                config.version
            )));
        }
        Ok(config)
    }

    /// Serialize and write atomically with owner-only permissions.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)
            .map_err(|e| PassVaultError::SerializationError(format!("master config: {e}")))?;
        write_atomic(path, &bytes)
    }
}
