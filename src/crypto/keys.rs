//! Key material types.
//!
//! Every private key in PassVault is a fixed 32-byte array wrapped in
//! [`SecretKey`], which wipes its memory when dropped.  Public keys are
//! plain `[u8; 32]` arrays since they are stored unencrypted anyway.

use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of every key in the vault (256 bits).
pub const KEY_LEN: usize = 32;

/// A Curve25519 public point as stored in the master config and registry.
pub type PublicKeyBytes = [u8; KEY_LEN];

/// A 32-byte secret key that zeroes its memory on drop.
///
/// Used for the password-derived wrap key, the master private key and
/// the ephemeral per-entry private keys.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; KEY_LEN],
}

impl SecretKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Generate a fresh random key from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        let key = Self::new(bytes);
        bytes.zeroize();
        key
    }

    /// Rebuild a key from a decrypted byte buffer.
    ///
    /// Returns `None` if the buffer is not exactly 32 bytes.  The input
    /// is zeroized either way.
    pub fn from_vec(mut raw: Vec<u8>) -> Option<Self> {
        let key = <[u8; KEY_LEN]>::try_from(raw.as_slice()).ok().map(Self::new);
        raw.zeroize();
        key
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Compute the X25519 public key for this private key.
    pub fn public_key(&self) -> PublicKeyBytes {
        let secret = crypto_box::SecretKey::from(self.bytes);
        *secret.public_key().as_bytes()
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(**redacted**)")
    }
}

/// An X25519 keypair: the master keypair or an ephemeral entry keypair.
#[derive(Debug)]
pub struct KeyPair {
    pub public: PublicKeyBytes,
    pub secret: SecretKey,
}

impl KeyPair {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        let secret = SecretKey::generate();
        let public = secret.public_key();
        Self { public, secret }
    }
}
