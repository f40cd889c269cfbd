//! Per-entry public-key sealing.
//!
//! An X25519 Diffie-Hellman between two keypairs yields a shared key;
//! the secret value is then encrypted with XChaCha20-Poly1305 under it.
//! Because DH is symmetric, a value sealed with
//! `(master_public, entry_secret)` opens with `(entry_public, master_secret)`.
//!
//! Each entry gets its own ephemeral keypair at creation.  The entry's
//! private key is dropped right after sealing, so the only way back to
//! the plaintext is through the master private key.
//!
//! Layout of the returned byte buffer:
//!   [ 24-byte nonce | ciphertext + 16-byte auth tag ]

use crypto_box::aead::{Aead, AeadCore, Nonce, OsRng};
use crypto_box::ChaChaBox;

use super::envelope::{NONCE_LEN, TAG_LEN};
use super::keys::{PublicKeyBytes, SecretKey};
use crate::errors::{PassVaultError, Result};

fn shared_box(public: &PublicKeyBytes, secret: &SecretKey) -> ChaChaBox {
    let public = crypto_box::PublicKey::from(*public);
    let secret = crypto_box::SecretKey::from(*secret.as_bytes());
    ChaChaBox::new(&public, &secret)
}

/// Seal `plaintext` from `sender_secret` to `recipient_public`.
pub fn seal_entry(
    plaintext: &[u8],
    recipient_public: &PublicKeyBytes,
    sender_secret: &SecretKey,
) -> Result<Vec<u8>> {
    let cipher = shared_box(recipient_public, sender_secret);
    let nonce = ChaChaBox::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| PassVaultError::EncryptionFailed(format!("entry seal: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Open a blob produced by `seal_entry` using the complementary keys.
pub fn open_entry(
    blob: &[u8],
    sender_public: &PublicKeyBytes,
    recipient_secret: &SecretKey,
) -> Result<Vec<u8>> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(PassVaultError::DecryptionFailed);
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let nonce = Nonce::<ChaChaBox>::from_slice(nonce_bytes);

    shared_box(sender_public, recipient_secret)
        .decrypt(nonce, ciphertext)
        .map_err(|_| PassVaultError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::KeyPair;

    #[test]
    fn complementary_keys_open_the_box() {
        let master = KeyPair::generate();
        let entry = KeyPair::generate();

        let blob = seal_entry(b"s3cr3t", &master.public, &entry.secret).unwrap();
        let opened = open_entry(&blob, &entry.public, &master.secret).unwrap();
        assert_eq!(opened, b"s3cr3t");
    }

    #[test]
    fn unrelated_master_cannot_open() {
        let master = KeyPair::generate();
        let intruder = KeyPair::generate();
        let entry = KeyPair::generate();

        let blob = seal_entry(b"s3cr3t", &master.public, &entry.secret).unwrap();
        assert!(open_entry(&blob, &entry.public, &intruder.secret).is_err());
    }

    #[test]
    fn truncated_blob_fails() {
        let master = KeyPair::generate();
        let entry = KeyPair::generate();
        assert!(matches!(
            open_entry(&[0u8; 10], &entry.public, &master.secret),
            Err(PassVaultError::DecryptionFailed)
        ));
    }
}
