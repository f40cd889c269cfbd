//! On-disk encoding helpers shared by the vault files.
//!
//! Byte fields are stored as base64 strings, and every file is written
//! through a staged sibling that is renamed into place.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::errors::Result;

/// Sibling path used while `path` is being rewritten.
fn staging_path(path: &Path) -> PathBuf {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    path.with_file_name(format!(".{name}.partial"))
}

/// Replace the contents of `path` so that no reader ever observes a
/// partial write.  The file ends up mode 0600 on Unix.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let staged = staging_path(path);

    let mut opts = fs::OpenOptions::new();
    opts.create(true).write(true).truncate(true);
    #[cfg(unix)]
    std::os::unix::fs::OpenOptionsExt::mode(&mut opts, 0o600);

    {
        let mut file = opts.open(&staged)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    if let Err(e) = fs::rename(&staged, path) {
        let _ = fs::remove_file(&staged);
        return Err(e.into());
    }
    Ok(())
}

/// `mkdir -p` with mode 0700 on Unix.
pub fn create_private_dir(dir: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)?;
    }
    #[cfg(not(unix))]
    fs::create_dir_all(dir)?;
    Ok(())
}

/// `#[serde(with = "b64")]` for variable-length byte fields.
pub(crate) mod b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom)
    }
}

/// `#[serde(with = "b64_key")]` for fields that must hold exactly one
/// 32-byte key.
pub(crate) mod b64_key {
    use serde::{Deserializer, Serializer};

    use crate::crypto::KEY_LEN;

    pub fn serialize<S: Serializer>(key: &[u8; KEY_LEN], s: S) -> Result<S::Ok, S::Error> {
        super::b64::serialize(key, s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; KEY_LEN], D::Error> {
        let bytes = super::b64::deserialize(d)?;
        <[u8; KEY_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
            serde::de::Error::invalid_length(bytes.len(), &"a 32-byte key")
        })
    }
}
