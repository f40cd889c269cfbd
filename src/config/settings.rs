use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::generate::{DEFAULT_LENGTH, MAX_LENGTH, MIN_LENGTH};
use crate::crypto::kdf::Argon2Params;
use crate::errors::{PassVaultError, Result};

/// Optional tuning knobs read from `<vault_dir>/settings.toml`.
///
/// Any key left out of the file keeps its default, and a missing file is
/// the same as an empty one.
///
/// ```toml
/// argon2_memory_kib = 65536
/// argon2_iterations = 3
/// argon2_parallelism = 4
/// generated_password_length = 20
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Argon2id memory cost in KiB for new vaults.
    pub argon2_memory_kib: u32,
    /// Argon2id passes for new vaults.
    pub argon2_iterations: u32,
    /// Argon2id lanes for new vaults.
    pub argon2_parallelism: u32,
    /// Length used by `generate` and `add --generate`.
    pub generated_password_length: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let argon2 = Argon2Params::default();
        Self {
            argon2_memory_kib: argon2.memory_kib,
            argon2_iterations: argon2.iterations,
            argon2_parallelism: argon2.parallelism,
            generated_password_length: DEFAULT_LENGTH,
        }
    }
}

impl Settings {
    /// Where the settings file lives for a given vault directory.
    pub fn path(vault_dir: &Path) -> PathBuf {
        vault_dir.join("settings.toml")
    }

    /// Read and validate the settings for `vault_dir`.
    pub fn load(vault_dir: &Path) -> Result<Self> {
        let file = Self::path(vault_dir);
        let settings = match std::fs::read_to_string(&file) {
            Ok(text) => toml::from_str::<Settings>(&text).map_err(|e| {
                PassVaultError::ConfigError(format!("{}: {e}", file.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };

        settings.validate().map_err(|reason| {
            PassVaultError::ConfigError(format!("{}: {reason}", file.display()))
        })?;
        Ok(settings)
    }

    /// Argon2id parameters for `init`.  Existing vaults keep whatever
    /// they were created with.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        self.argon2_params().validate().map_err(|e| match e {
            PassVaultError::KeyDerivationFailed(msg) => msg,
            other => other.to_string(),
        })?;
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.generated_password_length) {
            return Err(format!(
                "generated_password_length must be between {MIN_LENGTH} and {MAX_LENGTH}"
            ));
        }
        Ok(())
    }
}
