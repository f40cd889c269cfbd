use std::path::PathBuf;
use thiserror::Error;

/// Every failure a vault operation or CLI command can report.
///
/// Authentication and integrity failures are kept distinct: a wrong
/// master password is [`AuthenticationFailed`](Self::AuthenticationFailed),
/// while an entry blob that will not open under a correct password is
/// [`DecryptionFailed`](Self::DecryptionFailed).
#[derive(Debug, Error)]
pub enum PassVaultError {
    #[error("Vault not initialized at {0}; run `passvault init` first")]
    NotInitialized(PathBuf),

    #[error("A vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Entry '{0}' not found")]
    EntryNotFound(String),

    #[error("Entry '{0}' already exists; use `passvault edit` instead")]
    EntryAlreadyExists(String),

    #[error("'{path}' collides with existing entry '{existing}'")]
    PathConflict { path: String, existing: String },

    #[error("'{path}' is not a valid entry path: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Authentication failed: wrong master password or damaged master key")]
    AuthenticationFailed,

    #[error("Cannot open entry data: it was altered or sealed for a different key")]
    DecryptionFailed,

    #[error("No sealed data on disk for entry '{0}'")]
    BlobNotFound(String),

    #[error("Unreadable vault file: {0}")]
    InvalidVaultFormat(String),

    #[error("Could not encrypt: {0}")]
    EncryptionFailed(String),

    #[error("Could not derive key: {0}")]
    KeyDerivationFailed(String),

    #[error("Bad settings: {0}")]
    ConfigError(String),

    #[error("Could not encode or decode {0}")]
    SerializationError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Audit log unavailable: {0}")]
    AuditError(String),

    #[error("Clipboard unavailable: {0}")]
    ClipboardError(String),

    #[error("{0}")]
    CommandFailed(String),

    #[error("Cancelled")]
    UserCancelled,
}

pub type Result<T> = std::result::Result<T, PassVaultError>;
