//! Integration tests for the PassVault vault module.

use std::fs;

use passvault::crypto::kdf::Argon2Params;
use passvault::crypto::open_entry;
use passvault::errors::PassVaultError;
use passvault::vault::{Vault, VaultLayout};
use tempfile::TempDir;

const MASTER: &[u8] = b"P@ssw0rd!";

fn fast() -> Argon2Params {
    Argon2Params {
        memory_kib: 8_192,
        iterations: 1,
        parallelism: 1,
    }
}

/// Helper: a fresh vault inside a temp dir.
fn new_vault() -> (TempDir, Vault) {
    let dir = TempDir::new().expect("create temp dir");
    let layout = VaultLayout::new(dir.path().join(".passvault"));
    let vault = Vault::init(layout, MASTER, &fast()).expect("init vault");
    (dir, vault)
}

/// Helper: the vault from the scenarios, with `email/acme` in it.
fn acme_vault() -> (TempDir, Vault) {
    let (dir, mut vault) = new_vault();
    vault.add("email/acme", "alice", "s3cr3t-value").unwrap();
    (dir, vault)
}

fn reopen(vault: &Vault) -> Vault {
    Vault::open(vault.layout().clone()).expect("reopen vault")
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn init_add_show() {
    let (_dir, vault) = acme_vault();

    let vault = reopen(&vault);
    let key = vault.unlock(MASTER).unwrap();
    let cred = vault.show(&key, "email/acme").unwrap();

    assert_eq!(cred.path, "email/acme");
    assert_eq!(cred.username, "alice");
    assert_eq!(cred.secret.as_str(), "s3cr3t-value");
}

#[test]
fn wrong_master_password_is_rejected() {
    let (_dir, vault) = acme_vault();
    assert!(matches!(
        vault.unlock(b"wrong"),
        Err(PassVaultError::AuthenticationFailed)
    ));
}

#[test]
fn delete_then_show_is_not_found() {
    let (_dir, mut vault) = acme_vault();
    let key = vault.unlock(MASTER).unwrap();
    let blob_file = vault.blobs().blob_path("email/acme").unwrap();
    assert!(blob_file.is_file());

    vault.delete(&key, "email/acme").unwrap();

    assert!(matches!(
        vault.show(&key, "email/acme"),
        Err(PassVaultError::EntryNotFound(_))
    ));
    assert!(!blob_file.exists());

    let vault = reopen(&vault);
    assert!(vault.list().is_empty());
}

#[test]
fn edit_password_rotates_entry_key() {
    let (_dir, mut vault) = acme_vault();
    let key = vault.unlock(MASTER).unwrap();

    let old_public = vault.registry().find("email/acme").unwrap().public_key;
    let old_blob = vault.blobs().read("email/acme").unwrap();

    vault.edit_secret(&key, "email/acme", "new-secret").unwrap();

    let new_public = vault.registry().find("email/acme").unwrap().public_key;
    assert_ne!(old_public, new_public);
    assert_eq!(
        vault.show(&key, "email/acme").unwrap().secret.as_str(),
        "new-secret"
    );

    // The retained old ciphertext does not open under the new entry key.
    assert!(open_entry(&old_blob, &new_public, key.secret()).is_err());
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn open_uninitialized_fails() {
    let dir = TempDir::new().unwrap();
    let layout = VaultLayout::new(dir.path().join("missing"));
    assert!(matches!(
        Vault::open(layout),
        Err(PassVaultError::NotInitialized(_))
    ));
}

#[test]
fn init_refuses_existing_vault() {
    let (_dir, vault) = new_vault();
    let again = Vault::init(vault.layout().clone(), b"another-one", &fast());
    assert!(matches!(again, Err(PassVaultError::VaultAlreadyExists(_))));

    // The original password still works.
    assert!(reopen(&vault).unlock(MASTER).is_ok());
}

#[test]
fn duplicate_add_leaves_registry_unchanged() {
    let (_dir, mut vault) = acme_vault();
    let before = fs::read(vault.layout().registry_path()).unwrap();

    assert!(matches!(
        vault.add("email/acme", "mallory", "other"),
        Err(PassVaultError::EntryAlreadyExists(_))
    ));

    assert_eq!(fs::read(vault.layout().registry_path()).unwrap(), before);
    let key = vault.unlock(MASTER).unwrap();
    assert_eq!(vault.show(&key, "email/acme").unwrap().username, "alice");
}

#[test]
fn ancestor_and_descendant_paths_conflict() {
    let (_dir, mut vault) = acme_vault();
    assert!(matches!(
        vault.add("email", "x", "y"),
        Err(PassVaultError::PathConflict { .. })
    ));
    assert!(matches!(
        vault.add("email/acme/extra", "x", "y"),
        Err(PassVaultError::PathConflict { .. })
    ));
    // Siblings are fine.
    vault.add("email/other", "bob", "pw").unwrap();
    assert_eq!(vault.list().len(), 2);
}

#[test]
fn invalid_paths_are_rejected_before_writing() {
    let (_dir, mut vault) = new_vault();
    for bad in ["", "/abs", "trailing/", "a//b", "../up", ".hidden", "a\\b"] {
        assert!(vault.add(bad, "u", "s").is_err(), "{bad:?} accepted");
    }
    assert!(vault.list().is_empty());
    assert_eq!(fs::read_dir(vault.layout().blob_dir()).unwrap().count(), 0);
}

#[test]
fn edit_username_keeps_secret() {
    let (_dir, mut vault) = acme_vault();
    let key = vault.unlock(MASTER).unwrap();
    let public_before = vault.registry().find("email/acme").unwrap().public_key;

    vault.edit_username(&key, "email/acme", "alice2").unwrap();

    let vault = reopen(&vault);
    let entry = vault.registry().find("email/acme").unwrap();
    assert_eq!(entry.username, "alice2");
    assert_eq!(entry.public_key, public_before);

    let key = vault.unlock(MASTER).unwrap();
    assert_eq!(
        vault.show(&key, "email/acme").unwrap().secret.as_str(),
        "s3cr3t-value"
    );
}

#[test]
fn rename_moves_blob_and_registry() {
    let (_dir, mut vault) = acme_vault();
    let key = vault.unlock(MASTER).unwrap();
    let old_file = vault.blobs().blob_path("email/acme").unwrap();

    vault.rename(&key, "email/acme", "work/acme").unwrap();

    assert!(!old_file.exists());
    assert!(vault.blobs().exists("work/acme"));

    let vault = reopen(&vault);
    assert!(!vault.registry().contains("email/acme"));
    let key = vault.unlock(MASTER).unwrap();
    let cred = vault.show(&key, "work/acme").unwrap();
    assert_eq!(cred.username, "alice");
    assert_eq!(cred.secret.as_str(), "s3cr3t-value");
}

#[test]
fn rename_onto_existing_entry_fails_cleanly() {
    let (_dir, mut vault) = acme_vault();
    vault.add("money/bank", "bob", "pin").unwrap();
    let key = vault.unlock(MASTER).unwrap();

    assert!(matches!(
        vault.rename(&key, "email/acme", "money/bank"),
        Err(PassVaultError::EntryAlreadyExists(_))
    ));
    assert_eq!(vault.show(&key, "email/acme").unwrap().secret.as_str(), "s3cr3t-value");
    assert_eq!(vault.show(&key, "money/bank").unwrap().secret.as_str(), "pin");
}

#[test]
fn operations_on_missing_entries_are_not_found() {
    let (_dir, mut vault) = new_vault();
    let key = vault.unlock(MASTER).unwrap();

    assert!(matches!(vault.show(&key, "nope"), Err(PassVaultError::EntryNotFound(_))));
    assert!(matches!(
        vault.edit_username(&key, "nope", "x"),
        Err(PassVaultError::EntryNotFound(_))
    ));
    assert!(matches!(
        vault.edit_secret(&key, "nope", "x"),
        Err(PassVaultError::EntryNotFound(_))
    ));
    assert!(matches!(
        vault.rename(&key, "nope", "other"),
        Err(PassVaultError::EntryNotFound(_))
    ));
    assert!(matches!(vault.delete(&key, "nope"), Err(PassVaultError::EntryNotFound(_))));
}

#[test]
fn missing_blob_surfaces_blob_not_found() {
    let (_dir, vault) = acme_vault();
    fs::remove_file(vault.blobs().blob_path("email/acme").unwrap()).unwrap();

    let key = vault.unlock(MASTER).unwrap();
    assert!(matches!(
        vault.show(&key, "email/acme"),
        Err(PassVaultError::BlobNotFound(_))
    ));
}

#[test]
fn tampered_blob_is_decryption_failure() {
    let (_dir, vault) = acme_vault();
    let file = vault.blobs().blob_path("email/acme").unwrap();
    let mut bytes = fs::read(&file).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    fs::write(&file, bytes).unwrap();

    let key = vault.unlock(MASTER).unwrap();
    assert!(matches!(
        vault.show(&key, "email/acme"),
        Err(PassVaultError::DecryptionFailed)
    ));
}

#[test]
fn registry_holds_no_secret_material() {
    let (_dir, vault) = acme_vault();
    let registry = fs::read_to_string(vault.layout().registry_path()).unwrap();
    let master = fs::read_to_string(vault.layout().master_config_path()).unwrap();

    assert!(registry.contains("email/acme"));
    assert!(registry.contains("alice"));
    assert!(!registry.contains("s3cr3t-value"));
    assert!(!master.contains("P@ssw0rd!"));
}

#[test]
fn list_needs_no_password_and_keeps_order() {
    let (_dir, mut vault) = new_vault();
    vault.add("b", "u1", "1").unwrap();
    vault.add("a/x", "u2", "2").unwrap();

    let vault = reopen(&vault);
    let paths: Vec<&str> = vault.list().iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, ["b", "a/x"]);
}

#[cfg(unix)]
#[test]
fn vault_files_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, vault) = acme_vault();
    let layout = vault.layout();
    for file in [layout.master_config_path(), layout.registry_path()] {
        let mode = fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600, "{}", file.display());
    }
    let mode = fs::metadata(layout.blob_dir()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o700);
}

// ---------------------------------------------------------------------------
// Dangling entries
// ---------------------------------------------------------------------------

#[test]
fn entry_without_blob_can_still_be_deleted() {
    let (_dir, mut vault) = acme_vault();
    fs::remove_file(vault.blobs().blob_path("email/acme").unwrap()).unwrap();
    let key = vault.unlock(MASTER).unwrap();

    vault.delete(&key, "email/acme").unwrap();

    assert!(vault.list().is_empty());
    assert!(!reopen(&vault).registry().contains("email/acme"));
}

#[test]
fn entry_without_blob_can_be_resealed() {
    let (_dir, mut vault) = acme_vault();
    fs::remove_file(vault.blobs().blob_path("email/acme").unwrap()).unwrap();
    let key = vault.unlock(MASTER).unwrap();

    vault.edit_secret(&key, "email/acme", "fresh-secret").unwrap();

    let vault = reopen(&vault);
    let key = vault.unlock(MASTER).unwrap();
    let cred = vault.show(&key, "email/acme").unwrap();
    assert_eq!(cred.username, "alice");
    assert_eq!(cred.secret.as_str(), "fresh-secret");
}

#[test]
fn rename_onto_same_path_changes_nothing() {
    let (_dir, mut vault) = acme_vault();
    let key = vault.unlock(MASTER).unwrap();
    let before = vault.blobs().read("email/acme").unwrap();

    vault.rename(&key, "email/acme", "email/acme").unwrap();

    assert_eq!(vault.blobs().read("email/acme").unwrap(), before);
    assert_eq!(vault.show(&key, "email/acme").unwrap().secret.as_str(), "s3cr3t-value");
}

// ---------------------------------------------------------------------------
// Registry commit failures roll the blob tree back
// ---------------------------------------------------------------------------

/// Put a non-empty directory where `sites.json` lives so the next
/// registry save cannot rename over it.
fn block_registry_saves(vault: &Vault) {
    let registry = vault.layout().registry_path();
    fs::remove_file(&registry).unwrap();
    fs::create_dir(&registry).unwrap();
    fs::write(registry.join("keep"), b"").unwrap();
}

#[test]
fn failed_commit_on_add_removes_new_blob() {
    let (_dir, mut vault) = acme_vault();
    block_registry_saves(&vault);

    assert!(vault.add("money/bank", "bob", "pin").is_err());

    assert!(!vault.blobs().exists("money/bank"));
    assert!(!vault.blobs().root().join("money").exists());
    assert!(!vault.registry().contains("money/bank"));
    assert_eq!(vault.list().len(), 1);
}

#[test]
fn failed_commit_on_edit_secret_restores_old_blob() {
    let (_dir, mut vault) = acme_vault();
    let key = vault.unlock(MASTER).unwrap();
    let before = vault.blobs().read("email/acme").unwrap();
    block_registry_saves(&vault);

    assert!(vault.edit_secret(&key, "email/acme", "new-secret").is_err());

    assert_eq!(vault.blobs().read("email/acme").unwrap(), before);
    assert_eq!(vault.show(&key, "email/acme").unwrap().secret.as_str(), "s3cr3t-value");
}

#[test]
fn failed_commit_on_rename_moves_blob_back() {
    let (_dir, mut vault) = acme_vault();
    let key = vault.unlock(MASTER).unwrap();
    let before = vault.blobs().read("email/acme").unwrap();
    block_registry_saves(&vault);

    assert!(vault.rename(&key, "email/acme", "work/acme").is_err());

    assert_eq!(vault.blobs().read("email/acme").unwrap(), before);
    assert!(!vault.blobs().exists("work/acme"));
    assert!(!vault.blobs().root().join("work").exists());
    assert!(vault.registry().contains("email/acme"));
}

#[test]
fn failed_commit_on_delete_restores_blob() {
    let (_dir, mut vault) = acme_vault();
    let key = vault.unlock(MASTER).unwrap();
    let before = vault.blobs().read("email/acme").unwrap();
    block_registry_saves(&vault);

    assert!(vault.delete(&key, "email/acme").is_err());

    assert_eq!(vault.blobs().read("email/acme").unwrap(), before);
    assert!(vault.registry().contains("email/acme"));
    assert_eq!(vault.show(&key, "email/acme").unwrap().secret.as_str(), "s3cr3t-value");
}
