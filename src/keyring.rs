//! Key Store: the keyring and identity files.
//!
//! The keyring is a TOML file mapping key identifiers to symmetric keys:
//!
//! ```toml
//! [[key]]
//! description = "project-secrets"
//! key-id = "<hex sha-256 of the key>"
//! key = "<base64 key bytes>"
//! ```
//!
//! The identity file holds age X25519 secret keys, one per line, with `#`
//! comment lines. Both files live under the resolved coffer home (see
//! [`crate::config`]) and are only ever read by filter invocations; the
//! `gen-key` / `gen-identity` commands are the sole writers.

use std::fs;
use std::path::Path;

use age::secrecy::ExposeSecret;
use age::x25519::Identity;
use serde::{Deserialize, Serialize};

use crate::armor;
use crate::crypto::SecretKey;
use crate::error::{CofferError, Result};

pub const KEYRING_FILENAME: &str = ".coffer_keyring";
pub const IDENTITY_FILENAME: &str = ".coffer_identity";

/// Lookup interface consumed by the resolver. A keyring miss is the
/// distinguished [`CofferError::KeyNotFound`]; every other failure mode
/// (missing file, parse error, malformed entry) reports as
/// [`CofferError::Keyring`].
pub trait KeyStore {
    fn key_for(&self, key_id: &str) -> Result<SecretKey>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Keyring {
    #[serde(default, rename = "key")]
    entries: Vec<KeyEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct KeyEntry {
    description: String,
    #[serde(rename = "key-id")]
    key_id: String,
    key: String,
}

impl Keyring {
    /// Load a keyring file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            CofferError::Keyring(format!("unable to read {}: {e}", path.display()))
        })?;
        toml::from_str(&text)
            .map_err(|e| CofferError::Keyring(format!("malformed keyring {}: {e}", path.display())))
    }

    /// Load a keyring file, treating a missing file as an empty keyring.
    /// Used by `gen-key`, which may be creating the very first entry.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| CofferError::Keyring(format!("unable to serialize keyring: {e}")))?;
        fs::write(path, text)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    pub fn add(&mut self, description: &str, key: &SecretKey) {
        self.entries.push(KeyEntry {
            description: description.to_string(),
            key_id: key.key_id(),
            key: key.encode(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyStore for Keyring {
    fn key_for(&self, key_id: &str) -> Result<SecretKey> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.key_id == key_id)
            .ok_or_else(|| CofferError::KeyNotFound(key_id.to_string()))?;

        SecretKey::decode(&entry.key).map_err(|_| {
            CofferError::Keyring(format!("malformed key material for key-id {key_id}"))
        })
    }
}

/// [`KeyStore`] backed by a keyring file, loaded on each lookup. Filter
/// invocations are independent processes; the keyring is read fresh every
/// time so policy changes between runs are always observed.
pub struct FileKeyStore<'a> {
    path: &'a Path,
}

impl<'a> FileKeyStore<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self { path }
    }
}

impl KeyStore for FileKeyStore<'_> {
    fn key_for(&self, key_id: &str) -> Result<SecretKey> {
        Keyring::load(self.path)?.key_for(key_id)
    }
}

/// Load the identities the smudge path decrypts with.
pub fn load_identities(path: &Path) -> Result<Vec<Identity>> {
    if !path.exists() {
        return Err(CofferError::IdentityNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    armor::parse_identities(&text)
}

/// Append a freshly generated identity, creating the file if needed.
pub fn append_identity(path: &Path, description: &str, identity: &Identity) -> Result<()> {
    use std::io::Write;

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "# {description}")?;
    writeln!(file, "# public key: {}", identity.to_public())?;
    writeln!(file, "{}", identity.to_string().expose_secret())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}
