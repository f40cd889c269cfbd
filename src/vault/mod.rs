//! Vault module: on-disk credential storage.
//!
//! This module provides:
//! - Vault directory layout (`layout`)
//! - The master config with the sealed master key (`config`)
//! - The plaintext entry registry (`registry`)
//! - The per-entry sealed blob store (`blobs`)
//! - Entry path rules (`path`)
//! - Atomic write and base64 serde helpers (`format`)
//! - The high-level `Vault` used by CLI commands (`store`)

pub mod blobs;
pub mod config;
pub mod format;
pub mod layout;
pub mod path;
pub mod registry;
pub mod store;

// Re-export the most commonly used items.
pub use blobs::BlobStore;
pub use config::MasterConfig;
pub use layout::VaultLayout;
pub use registry::{Registry, RegistryEntry};
pub use store::{Credential, UnlockedKey, Vault};
