//! Blob store: one sealed ciphertext file per entry.
//!
//! The entry path doubles as the relative file path under the blob
//! directory, so `money/bank` lives at `<vault>/vault/money/bank`.
//! Directories are created on demand and pruned when they empty out.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::format::{create_private_dir, write_atomic};
use super::path;
use crate::errors::{PassVaultError, Result};

/// Holding name for a blob mid-rename.  Entry segments cannot start
/// with `.`, so it never collides with a real entry.
const STAGING_NAME: &str = ".rename.partial";

/// Handle on the blob directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open a blob store rooted at `root` without touching the disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the blob directory (owner-only) if needed.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(root);
        create_private_dir(&store.root)?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an entry path to its file, validating it first.
    pub fn blob_path(&self, entry_path: &str) -> Result<PathBuf> {
        path::validate(entry_path)?;
        Ok(entry_path
            .split('/')
            .fold(self.root.clone(), |acc, segment| acc.join(segment)))
    }

    /// `true` if a blob file exists for `entry_path`.
    pub fn exists(&self, entry_path: &str) -> bool {
        self.blob_path(entry_path)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Write (or overwrite) the ciphertext for `entry_path`.
    pub fn write(&self, entry_path: &str, ciphertext: &[u8]) -> Result<()> {
        let file = self.blob_path(entry_path)?;
        if file.is_dir() {
            return Err(PassVaultError::PathConflict {
                path: entry_path.to_string(),
                existing: format!("{entry_path}/…"),
            });
        }
        if let Some(parent) = file.parent() {
            create_private_dir(parent)?;
        }
        write_atomic(&file, ciphertext)
    }

    /// Read the ciphertext for `entry_path`.
    pub fn read(&self, entry_path: &str) -> Result<Vec<u8>> {
        let file = self.blob_path(entry_path)?;
        if !file.is_file() {
            return Err(PassVaultError::BlobNotFound(entry_path.to_string()));
        }
        Ok(fs::read(file)?)
    }

    /// Remove the blob for `entry_path` and prune emptied directories.
    pub fn delete(&self, entry_path: &str) -> Result<()> {
        let file = self.blob_path(entry_path)?;
        if !file.is_file() {
            return Err(PassVaultError::BlobNotFound(entry_path.to_string()));
        }
        fs::remove_file(&file)?;
        self.prune_empty_parents(&file);
        Ok(())
    }

    /// Move a blob to a new entry path.
    ///
    /// Goes through a temporary name in the blob root so that renaming
    /// `a` to `a/b` (or back) works even though the source file and the
    /// destination directory share a name.
    pub fn rename(&self, old_path: &str, new_path: &str) -> Result<()> {
        let from = self.blob_path(old_path)?;
        let to = self.blob_path(new_path)?;
        if !from.is_file() {
            return Err(PassVaultError::BlobNotFound(old_path.to_string()));
        }
        if from == to {
            return Ok(());
        }
        // A directory at the target is fine if it only held the source.
        if to.is_file() {
            return Err(PassVaultError::EntryAlreadyExists(new_path.to_string()));
        }

        let staging = self.root.join(STAGING_NAME);

        fs::rename(&from, &staging)?;
        self.prune_empty_parents(&from);

        let placed = (|| -> Result<()> {
            if let Some(parent) = to.parent() {
                create_private_dir(parent)?;
            }
            fs::rename(&staging, &to)?;
            Ok(())
        })();

        if placed.is_err() {
            // Put the blob back where it was so the registry stays valid.
            let restored = from
                .parent()
                .map_or(Ok(()), create_private_dir)
                .and_then(|()| fs::rename(&staging, &from).map_err(Into::into));
            if let Err(e) = restored {
                warn!(path = old_path, error = %e, "blob left at {}", staging.display());
            }
        }
        placed
    }

    /// Remove empty directories between `file` and the blob root.
    fn prune_empty_parents(&self, file: &Path) {
        let mut dir = file.parent();
        while let Some(d) = dir {
            if d == self.root || !d.starts_with(&self.root) {
                break;
            }
            // `remove_dir` only succeeds on empty directories.
            if fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }
}
