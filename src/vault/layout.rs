//! Vault directory layout.
//!
//! ```text
//! ~/.passvault/
//!   master.json     master public key, sealed private key, verifier
//!   sites.json      registry of entries
//!   vault/          sealed blobs, one file per entry path
//!   settings.toml   optional settings
//!   audit.db        operation history
//! ```

use std::path::{Path, PathBuf};

use crate::errors::{PassVaultError, Result};

/// Name of the vault directory under the user's home.
pub const DEFAULT_DIR_NAME: &str = ".passvault";

const MASTER_FILE: &str = "master.json";
const REGISTRY_FILE: &str = "sites.json";
const BLOB_DIR: &str = "vault";

/// Resolved locations of every file in one vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultLayout {
    root: PathBuf,
}

impl VaultLayout {
    /// Use `root` as the vault directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the vault directory: an explicit override if given,
    /// otherwise `~/.passvault`.
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self> {
        match override_dir {
            Some(dir) => Ok(Self::new(dir)),
            None => {
                let home = dirs::home_dir().ok_or_else(|| {
                    PassVaultError::ConfigError("cannot determine home directory".into())
                })?;
                Ok(Self::new(home.join(DEFAULT_DIR_NAME)))
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn master_config_path(&self) -> PathBuf {
        self.root.join(MASTER_FILE)
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root.join(REGISTRY_FILE)
    }

    pub fn blob_dir(&self) -> PathBuf {
        self.root.join(BLOB_DIR)
    }

    /// `true` once `init` has written the master config.
    pub fn is_initialized(&self) -> bool {
        self.master_config_path().is_file()
    }
}
