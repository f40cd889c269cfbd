//! High-level vault operations used by CLI commands.
//!
//! `Vault` is the explicit context every command works through: the
//! resolved layout, the loaded master config, the registry and the blob
//! store.  Operations that reveal or change secrets take an
//! [`UnlockedKey`], which can only be obtained from [`Vault::unlock`]
//! with the right master password.
//!
//! Within one operation the blob store is always mutated first and the
//! registry committed second; if the registry write fails the blob
//! change is rolled back.

use chrono::Utc;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::kdf::{self, Argon2Params, WrapKdf};
use crate::crypto::{envelope, sealing, KeyPair, PublicKeyBytes, SecretKey};
use crate::errors::{PassVaultError, Result};

use super::blobs::BlobStore;
use super::config::{MasterConfig, StoredWrapKdf, CURRENT_VERSION};
use super::format::create_private_dir;
use super::layout::VaultLayout;
use super::registry::{Registry, RegistryEntry};

/// The master private key, recovered by a successful unlock.
///
/// Zeroized on drop.  Holding one is proof the master password was
/// verified for this vault.
pub struct UnlockedKey {
    secret: SecretKey,
}

impl UnlockedKey {
    /// Access the master private key.
    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

/// A decrypted credential returned by `show`.
pub struct Credential {
    pub path: String,
    pub username: String,
    pub secret: Zeroizing<String>,
}

/// The main vault handle.  Create one with `Vault::init` or
/// `Vault::open`, then use its methods to manage entries.
pub struct Vault {
    layout: VaultLayout,
    config: MasterConfig,
    registry: Registry,
    blobs: BlobStore,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a brand-new vault under `layout`.
    ///
    /// Derives the verifier and the wrap key from the password, generates
    /// the master keypair, seals the private half, then writes the blob
    /// directory, an empty registry and finally `master.json`.  The
    /// master config is written last so a vault only counts as
    /// initialized once everything else is in place.
    pub fn init(layout: VaultLayout, password: &[u8], params: &Argon2Params) -> Result<Self> {
        let config_path = layout.master_config_path();
        if config_path.exists() {
            return Err(PassVaultError::VaultAlreadyExists(layout.root().to_path_buf()));
        }

        // 1. Password verifier and wrap key, with independent salts.
        let password_verifier = kdf::derive_verifier(password, params)?;
        let wrap_kdf = WrapKdf::generate(*params);
        let wrap_key = kdf::derive_key(password, &wrap_kdf)?;

        // 2. Master keypair; only the sealed private half is stored.
        let master = KeyPair::generate();
        let master_private_key_sealed = envelope::seal(&wrap_key, master.secret.as_bytes())?;

        let config = MasterConfig {
            version: CURRENT_VERSION,
            master_public_key: master.public,
            master_private_key_sealed,
            password_verifier,
            wrap_kdf: StoredWrapKdf::from(&wrap_kdf),
            created_at: Utc::now(),
        };

        // 3. Directories and registry.  A registry left behind by an
        //    interrupted init is reused only if it is empty.
        create_private_dir(layout.root())?;
        let blobs = BlobStore::create(layout.blob_dir())?;
        let registry_path = layout.registry_path();
        let registry = if registry_path.exists() {
            let existing = Registry::load(&registry_path)?;
            if !existing.is_empty() {
                return Err(PassVaultError::InvalidVaultFormat(format!(
                    "{} already holds entries sealed for another master key",
                    registry_path.display()
                )));
            }
            existing
        } else {
            Registry::create(&registry_path)?
        };

        // 4. Commit.
        config.save(&config_path)?;
        debug!(root = %layout.root().display(), "vault initialized");

        Ok(Self {
            layout,
            config,
            registry,
            blobs,
        })
    }

    /// Open an existing vault.  No password is needed to read metadata.
    pub fn open(layout: VaultLayout) -> Result<Self> {
        let config = MasterConfig::load(&layout.master_config_path())?;
        let registry = Registry::load(&layout.registry_path())?;
        let blobs = BlobStore::new(layout.blob_dir());
        debug!(entries = registry.len(), "vault opened");

        Ok(Self {
            layout,
            config,
            registry,
            blobs,
        })
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Verify the master password and recover the master private key.
    ///
    /// Every failure mode (wrong password, tampered envelope, mismatched
    /// key) yields the same `AuthenticationFailed`.
    pub fn unlock(&self, password: &[u8]) -> Result<UnlockedKey> {
        if !kdf::verify(password, &self.config.password_verifier)? {
            debug!("master password rejected by verifier");
            return Err(PassVaultError::AuthenticationFailed);
        }

        let wrap_kdf = self.config.wrap_kdf.to_wrap_kdf()?;
        let wrap_key = kdf::derive_key(password, &wrap_kdf)?;

        let raw = envelope::open(&wrap_key, &self.config.master_private_key_sealed)
            .map_err(|_| PassVaultError::AuthenticationFailed)?;
        let secret = SecretKey::from_vec(raw).ok_or(PassVaultError::AuthenticationFailed)?;

        // The unwrapped key must match the public key entries are sealed to.
        let derived_public = secret.public_key();
        let matches = derived_public
            .as_slice()
            .ct_eq(self.config.master_public_key.as_slice());
        if !bool::from(matches) {
            return Err(PassVaultError::AuthenticationFailed);
        }

        Ok(UnlockedKey { secret })
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Add a new entry.
    ///
    /// Seals `secret` under a fresh entry keypair and the master public
    /// key.  Adding does not require the master password.
    pub fn add(&mut self, path: &str, username: &str, secret: &str) -> Result<()> {
        self.registry.check_available(path, None)?;

        let public_key = self.seal_new(path, secret)?;

        let entry = RegistryEntry::new(path, username, public_key);
        if let Err(e) = self.commit_registry(|reg| reg.add(entry)) {
            undo("remove new blob", path, self.blobs.delete(path));
            return Err(e);
        }

        debug!(path, "entry added");
        Ok(())
    }

    /// Decrypt an entry.
    pub fn show(&self, key: &UnlockedKey, path: &str) -> Result<Credential> {
        let entry = self.registry.find(path)?;
        let blob = self.blobs.read(path)?;

        let plaintext = sealing::open_entry(&blob, &entry.public_key, key.secret())?;
        let secret = String::from_utf8(plaintext).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            PassVaultError::SerializationError("secret value (not UTF-8)".to_string())
        })?;

        Ok(Credential {
            path: entry.path.clone(),
            username: entry.username.clone(),
            secret: Zeroizing::new(secret),
        })
    }

    /// Change an entry's username.  The secret is untouched.
    pub fn edit_username(&mut self, _key: &UnlockedKey, path: &str, username: &str) -> Result<()> {
        self.registry.find(path)?;
        self.commit_registry(|reg| reg.set_username(path, username))?;
        debug!(path, "username updated");
        Ok(())
    }

    /// Replace an entry's secret, rotating its keypair.
    ///
    /// An entry whose blob has gone missing is sealed afresh.
    pub fn edit_secret(&mut self, _key: &UnlockedKey, path: &str, secret: &str) -> Result<()> {
        self.registry.find(path)?;
        let previous = self.existing_blob(path)?;

        let public_key = self.seal_new(path, secret)?;

        if let Err(e) = self.commit_registry(|reg| reg.replace_public_key(path, public_key)) {
            let restored = match &previous {
                Some(bytes) => self.blobs.write(path, bytes),
                None => self.blobs.delete(path),
            };
            undo("restore previous blob", path, restored);
            return Err(e);
        }

        debug!(path, "secret resealed under a new entry key");
        Ok(())
    }

    /// Move an entry to `new_path`.
    pub fn rename(&mut self, _key: &UnlockedKey, path: &str, new_path: &str) -> Result<()> {
        self.registry.find(path)?;
        if path == new_path {
            return Ok(());
        }
        self.registry.check_available(new_path, Some(path))?;

        self.blobs.rename(path, new_path)?;

        if let Err(e) = self.commit_registry(|reg| reg.rename(path, new_path)) {
            undo("move blob back", path, self.blobs.rename(new_path, path));
            return Err(e);
        }

        debug!(from = path, to = new_path, "entry renamed");
        Ok(())
    }

    /// Remove an entry and its blob.  A registry entry whose blob is
    /// already gone is still removed.
    pub fn delete(&mut self, _key: &UnlockedKey, path: &str) -> Result<()> {
        self.registry.find(path)?;
        let previous = self.existing_blob(path)?;

        if previous.is_some() {
            self.blobs.delete(path)?;
        }

        if let Err(e) = self.commit_registry(|reg| reg.remove(path).map(|_| ())) {
            if let Some(bytes) = &previous {
                undo("restore deleted blob", path, self.blobs.write(path, bytes));
            }
            return Err(e);
        }

        debug!(path, "entry deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// All entries, in the order they were added.
    pub fn list(&self) -> &[RegistryEntry] {
        self.registry.entries()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    pub fn layout(&self) -> &VaultLayout {
        &self.layout
    }

    pub fn config(&self) -> &MasterConfig {
        &self.config
    }

    pub fn master_public_key(&self) -> &PublicKeyBytes {
        &self.config.master_public_key
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Seal `secret` for `path` under a fresh entry keypair, write the
    /// blob, and return the entry public key.  The entry private key is
    /// dropped (and zeroized) on return.
    fn seal_new(&self, path: &str, secret: &str) -> Result<PublicKeyBytes> {
        let entry = KeyPair::generate();
        let sealed =
            sealing::seal_entry(secret.as_bytes(), &self.config.master_public_key, &entry.secret)?;
        self.blobs.write(path, &sealed)?;
        Ok(entry.public)
    }

    /// The current ciphertext for `path`, or `None` if the file is gone.
    fn existing_blob(&self, path: &str) -> Result<Option<Zeroizing<Vec<u8>>>> {
        match self.blobs.read(path) {
            Ok(bytes) => Ok(Some(Zeroizing::new(bytes))),
            Err(PassVaultError::BlobNotFound(_)) => {
                warn!(path, "registry entry has no blob");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Apply `mutate` to the registry and save it.  On failure the
    /// in-memory registry goes back to its state before the call.
    fn commit_registry<F>(&mut self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Registry) -> Result<()>,
    {
        let snapshot = self.registry.clone();
        let outcome = mutate(&mut self.registry).and_then(|()| self.registry.save());
        if outcome.is_err() {
            self.registry = snapshot;
        }
        outcome
    }
}

/// Report a blob rollback that could not be completed.  The registry and
/// blob tree disagree for `path` afterwards.
fn undo(step: &str, path: &str, result: Result<()>) {
    if let Err(e) = result {
        warn!(path, step, error = %e, "rollback failed; registry and blobs disagree");
    }
}
