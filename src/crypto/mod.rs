//! Cryptographic primitives for PassVault.
//!
//! This module provides:
//! - Argon2id password verification and wrap-key derivation (`kdf`)
//! - XChaCha20-Poly1305 envelope for the master private key (`envelope`)
//! - X25519 per-entry sealing (`sealing`)
//! - Zeroizing key types (`keys`)
//! - Random password generation (`generate`)

pub mod envelope;
pub mod generate;
pub mod kdf;
pub mod keys;
pub mod sealing;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal_entry, open_entry, KeyPair, ...};
pub use envelope::{open, seal};
pub use generate::generate_password;
pub use kdf::{derive_key, derive_verifier, verify, Argon2Params, WrapKdf};
pub use keys::{KeyPair, PublicKeyBytes, SecretKey, KEY_LEN};
pub use sealing::{open_entry, seal_entry};
