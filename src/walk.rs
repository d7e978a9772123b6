//! Recursive Decryptor: batch smudge over a directory tree.
//!
//! Used to take a whole checkout from repository form to plaintext without
//! going through git, for example on a build host that received an encrypted
//! export. One unreadable or misconfigured file must not block the rest of
//! the tree, so per-file failures are logged and counted, and the overall
//! call fails only after every file has been attempted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use age::x25519::Identity;
use tracing::error;

use crate::armor;
use crate::classify::{classify, Classification};
use crate::config::Config;
use crate::crypto::SecretKey;
use crate::error::{CofferError, Result};
use crate::keyring::{self, FileKeyStore};
use crate::resolve::{self, OsFs};

/// Decrypt every regular file under `root` in place.
///
/// An explicit key override must itself decode; a bad override fails the
/// whole operation before any file is touched. With an override pinned,
/// every symmetric file is decrypted with it and armored files are skipped
/// (the override is symmetric key material). Without one, each file resolves
/// its key the same way smudge does, and armored files decrypt with the
/// configured identities.
pub fn decrypt_tree(root: &Path, key_override: Option<&str>, cfg: &Config) -> Result<()> {
    let pinned = match key_override {
        Some(text) => Some(
            SecretKey::decode(text)
                .map_err(|_| CofferError::InvalidKeyOverride(text.to_string()))?,
        ),
        None => None,
    };

    let mut files = Vec::new();
    collect_files(root, &mut files)?;

    // identities load at most once, and only if an armored file shows up
    let mut identities: Option<Vec<Identity>> = None;

    let mut failed = 0usize;
    for path in &files {
        match decrypt_file(path, pinned.as_ref(), &mut identities, cfg) {
            Ok(()) => {}
            Err(err) => {
                error!(path = %path.display(), %err, "failed to decrypt");
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(CofferError::DecryptTree(failed));
    }
    Ok(())
}

fn decrypt_file(
    path: &Path,
    pinned: Option<&SecretKey>,
    identities: &mut Option<Vec<Identity>>,
    cfg: &Config,
) -> Result<()> {
    let input = fs::read(path)?;

    let plaintext = match classify(&input) {
        Classification::Plaintext => return Ok(()),
        Classification::SymmetricCiphertext => {
            let key = match pinned {
                Some(key) => key.clone(),
                None => {
                    let keys = FileKeyStore::new(&cfg.keyring_path);
                    resolve::resolve_key(path, &OsFs, &keys)?
                }
            };
            key.decrypt(&input)?
        }
        Classification::AsymmetricArmored => {
            if pinned.is_some() {
                return Ok(());
            }
            let ids = match identities.take() {
                Some(ids) => ids,
                None => keyring::load_identities(&cfg.identity_path)?,
            };
            let decrypted = armor::decrypt(&input, &ids);
            *identities = Some(ids);
            decrypted?
        }
    };

    fs::write(path, plaintext)?;
    Ok(())
}

// Regular files under `dir`, sorted per directory. Symlinks are skipped.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(&entry.path(), files)?;
        } else if file_type.is_file() {
            files.push(entry.path());
        }
    }
    Ok(())
}
