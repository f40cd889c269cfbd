//! The entry registry (`sites.json`).
//!
//! An ordered, unencrypted catalog of entry metadata: path, username and
//! the entry's public key.  The secret value itself lives sealed in the
//! blob store.  All mutations happen in memory and are committed with
//! [`Registry::save`], which rewrites the whole file atomically.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::{b64_key, write_atomic};
use super::path;
use crate::crypto::PublicKeyBytes;
use crate::errors::{PassVaultError, Result};

/// Metadata for one stored credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Slash-delimited entry path (e.g. "money/bank").
    pub path: String,

    /// Plaintext username for the site.
    pub username: String,

    /// Public half of the entry's ephemeral keypair.
    #[serde(with = "b64_key")]
    pub public_key: PublicKeyBytes,

    /// When this entry was first added.
    pub created_at: DateTime<Utc>,

    /// When the username, secret or path last changed.
    pub updated_at: DateTime<Utc>,
}

impl RegistryEntry {
    /// Build a fresh entry stamped with the current time.
    pub fn new(path: &str, username: &str, public_key: PublicKeyBytes) -> Self {
        let now = Utc::now();
        Self {
            path: path.to_string(),
            username: username.to_string(),
            public_key,
            created_at: now,
            updated_at: now,
        }
    }

    /// The last path segment (`bank` for `money/bank`).
    pub fn name(&self) -> &str {
        path::split_group(&self.path).1
    }

    /// Everything before the last segment (`money` for `money/bank`).
    pub fn group(&self) -> &str {
        path::split_group(&self.path).0
    }
}

/// In-memory copy of `sites.json`.
#[derive(Debug, Clone)]
pub struct Registry {
    file: PathBuf,
    entries: Vec<RegistryEntry>,
}

impl Registry {
    /// Write an empty registry to `file`.
    pub fn create(file: &Path) -> Result<Self> {
        let registry = Self {
            file: file.to_path_buf(),
            entries: Vec::new(),
        };
        registry.save()?;
        Ok(registry)
    }

    /// Read the registry from `file`.
    ///
    /// A missing file means the vault was never initialized.
    pub fn load(file: &Path) -> Result<Self> {
        if !file.exists() {
            let root = file.parent().unwrap_or(Path::new("."));
            return Err(PassVaultError::NotInitialized(root.to_path_buf()));
        }

        let data = fs::read(file)?;
        let entries: Vec<RegistryEntry> = serde_json::from_slice(&data)
            .map_err(|e| PassVaultError::InvalidVaultFormat(format!("registry: {e}")))?;

        Ok(Self {
            file: file.to_path_buf(),
            entries,
        })
    }

    /// Rewrite the whole registry file atomically.
    pub fn save(&self) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&self.entries)
            .map_err(|e| PassVaultError::SerializationError(format!("registry: {e}")))?;
        write_atomic(&self.file, &bytes)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// All entries in insertion order.
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.position(path).is_some()
    }

    /// Find an entry by exact path.
    pub fn find(&self, path: &str) -> Result<&RegistryEntry> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .ok_or_else(|| PassVaultError::EntryNotFound(path.to_string()))
    }

    /// Entries grouped by parent path, groups and names sorted.
    ///
    /// Top-level entries land in the `""` group.
    pub fn groups(&self) -> BTreeMap<&str, Vec<&RegistryEntry>> {
        let mut groups: BTreeMap<&str, Vec<&RegistryEntry>> = BTreeMap::new();
        for entry in &self.entries {
            groups.entry(entry.group()).or_default().push(entry);
        }
        for members in groups.values_mut() {
            members.sort_by(|a, b| a.name().cmp(b.name()));
        }
        groups
    }

    /// Check that `path` is valid and could be added without clashing.
    ///
    /// `ignoring` names an entry to leave out of the check (the entry
    /// being renamed).
    pub fn check_available(&self, path: &str, ignoring: Option<&str>) -> Result<()> {
        path::validate(path)?;

        for existing in self.entries.iter().filter(|e| Some(e.path.as_str()) != ignoring) {
            if existing.path == path {
                return Err(PassVaultError::EntryAlreadyExists(path.to_string()));
            }
            if path::conflicts(&existing.path, path) {
                return Err(PassVaultError::PathConflict {
                    path: path.to_string(),
                    existing: existing.path.clone(),
                });
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mutation (in memory; call `save` to persist)
    // ------------------------------------------------------------------

    /// Append a new entry.  Duplicates and conflicting paths are
    /// rejected and leave the registry unchanged.
    pub fn add(&mut self, entry: RegistryEntry) -> Result<()> {
        self.check_available(&entry.path, None)?;
        self.entries.push(entry);
        Ok(())
    }

    /// Change the username of an entry in place.
    pub fn set_username(&mut self, path: &str, username: &str) -> Result<()> {
        let entry = self.find_mut(path)?;
        entry.username = username.to_string();
        entry.updated_at = Utc::now();
        Ok(())
    }

    /// Swap in a new public key after the secret was resealed.
    pub fn replace_public_key(&mut self, path: &str, public_key: PublicKeyBytes) -> Result<()> {
        let entry = self.find_mut(path)?;
        entry.public_key = public_key;
        entry.updated_at = Utc::now();
        Ok(())
    }

    /// Move an entry to a new path, keeping its position.
    pub fn rename(&mut self, old_path: &str, new_path: &str) -> Result<()> {
        self.check_available(new_path, Some(old_path))?;
        let entry = self.find_mut(old_path)?;
        entry.path = new_path.to_string();
        entry.updated_at = Utc::now();
        Ok(())
    }

    /// Remove and return an entry.
    pub fn remove(&mut self, path: &str) -> Result<RegistryEntry> {
        let idx = self
            .position(path)
            .ok_or_else(|| PassVaultError::EntryNotFound(path.to_string()))?;
        Ok(self.entries.remove(idx))
    }

    fn position(&self, path: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.path == path)
    }

    fn find_mut(&mut self, path: &str) -> Result<&mut RegistryEntry> {
        self.entries
            .iter_mut()
            .find(|e| e.path == path)
            .ok_or_else(|| PassVaultError::EntryNotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn registry() -> (TempDir, Registry) {
        let dir = TempDir::new().unwrap();
        let reg = Registry::create(&dir.path().join("sites.json")).unwrap();
        (dir, reg)
    }

    #[test]
    fn create_writes_empty_list() {
        let (dir, _reg) = registry();
        let raw = fs::read_to_string(dir.path().join("sites.json")).unwrap();
        assert_eq!(raw.trim(), "[]");
    }

    #[test]
    fn load_missing_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        let result = Registry::load(&dir.path().join("sites.json"));
        assert!(matches!(result, Err(PassVaultError::NotInitialized(_))));
    }

    #[test]
    fn load_garbage_is_invalid_format() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("sites.json");
        fs::write(&file, "{{{").unwrap();
        assert!(matches!(
            Registry::load(&file),
            Err(PassVaultError::InvalidVaultFormat(_))
        ));
    }

    #[test]
    fn add_save_load_keeps_order() {
        let (dir, mut reg) = registry();
        reg.add(RegistryEntry::new("zeta", "z", [1; 32])).unwrap();
        reg.add(RegistryEntry::new("alpha", "a", [2; 32])).unwrap();
        reg.save().unwrap();

        let loaded = Registry::load(&dir.path().join("sites.json")).unwrap();
        let paths: Vec<&str> = loaded.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["zeta", "alpha"]);
        assert_eq!(loaded.find("alpha").unwrap().public_key, [2; 32]);
    }

    #[test]
    fn duplicate_add_is_rejected_and_registry_unchanged() {
        let (_dir, mut reg) = registry();
        reg.add(RegistryEntry::new("email/acme", "alice", [1; 32])).unwrap();

        let result = reg.add(RegistryEntry::new("email/acme", "mallory", [9; 32]));
        assert!(matches!(result, Err(PassVaultError::EntryAlreadyExists(_))));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.find("email/acme").unwrap().username, "alice");
    }

    #[test]
    fn ancestor_and_descendant_paths_conflict() {
        let (_dir, mut reg) = registry();
        reg.add(RegistryEntry::new("email", "x", [1; 32])).unwrap();
        assert!(matches!(
            reg.add(RegistryEntry::new("email/acme", "y", [2; 32])),
            Err(PassVaultError::PathConflict { .. })
        ));

        reg.add(RegistryEntry::new("bank/main", "x", [3; 32])).unwrap();
        assert!(matches!(
            reg.add(RegistryEntry::new("bank", "y", [4; 32])),
            Err(PassVaultError::PathConflict { .. })
        ));
    }

    #[test]
    fn rename_checks_target_but_ignores_self() {
        let (_dir, mut reg) = registry();
        reg.add(RegistryEntry::new("a", "u", [1; 32])).unwrap();
        reg.add(RegistryEntry::new("b", "u", [2; 32])).unwrap();

        assert!(reg.rename("a", "b").is_err());
        reg.rename("a", "a/nested").unwrap();
        assert!(reg.contains("a/nested"));
        assert!(!reg.contains("a"));
    }

    #[test]
    fn set_username_and_replace_key_touch_updated_at() {
        let (_dir, mut reg) = registry();
        reg.add(RegistryEntry::new("site", "old", [1; 32])).unwrap();
        let before = reg.find("site").unwrap().clone();

        reg.set_username("site", "new").unwrap();
        reg.replace_public_key("site", [7; 32]).unwrap();

        let after = reg.find("site").unwrap();
        assert_eq!(after.username, "new");
        assert_eq!(after.public_key, [7; 32]);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at >= before.updated_at);
    }

    #[test]
    fn remove_missing_is_not_found() {
        let (_dir, mut reg) = registry();
        assert!(matches!(
            reg.remove("nope"),
            Err(PassVaultError::EntryNotFound(_))
        ));
    }

    #[test]
    fn groups_sort_names_within_group() {
        let (_dir, mut reg) = registry();
        reg.add(RegistryEntry::new("money/ocbc", "u", [1; 32])).unwrap();
        reg.add(RegistryEntry::new("github", "u", [2; 32])).unwrap();
        reg.add(RegistryEntry::new("money/dbs", "u", [3; 32])).unwrap();

        let groups = reg.groups();
        let keys: Vec<&str> = groups.keys().copied().collect();
        assert_eq!(keys, vec!["", "money"]);
        let money: Vec<&str> = groups["money"].iter().map(|e| e.name()).collect();
        assert_eq!(money, vec!["dbs", "ocbc"]);
    }
}
