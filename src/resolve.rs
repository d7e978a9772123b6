//! Recipient/key resolution.
//!
//! Policy marker files sit anywhere in the directory tree and apply to every
//! file beneath them. Resolution walks from the file's own directory outward;
//! the nearest marker wins, and a recipients marker beats a key-id marker in
//! the same directory. The walk is read-only, recomputed per invocation, and
//! expressed over [`PolicyFs`] so it can be tested without touching disk.

use std::fs;
use std::path::{Path, PathBuf};

use age::x25519::Recipient;

use crate::armor;
use crate::crypto::SecretKey;
use crate::error::{CofferError, Result};
use crate::keyring::KeyStore;

/// Asymmetric policy marker: one age public key per line.
pub const RECIPIENTS_FILENAME: &str = ".coffer-recipients";
/// Symmetric policy marker: a single key identifier.
pub const KEYID_FILENAME: &str = ".coffer-keyid";

/// Filesystem queries the resolver is allowed to make.
pub trait PolicyFs {
    fn is_dir(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// The real filesystem.
pub struct OsFs;

impl PolicyFs for OsFs {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }
}

/// What the nearest policy marker names for a path.
#[derive(Debug)]
pub enum Resolution {
    Recipients(Vec<Recipient>),
    Key(SecretKey),
}

/// Find the policy governing `path`. Used by the clean filter, where the
/// absence of any marker is a fatal configuration error for the caller.
pub fn resolve(path: &Path, fs: &dyn PolicyFs, keys: &dyn KeyStore) -> Result<Resolution> {
    for dir in ancestor_dirs(path) {
        if !fs.is_dir(&dir) {
            continue;
        }
        let recipients_marker = dir.join(RECIPIENTS_FILENAME);
        if fs.is_file(&recipients_marker) {
            let text = fs.read_to_string(&recipients_marker)?;
            return Ok(Resolution::Recipients(armor::parse_recipients(&text)?));
        }
        let keyid_marker = dir.join(KEYID_FILENAME);
        if fs.is_file(&keyid_marker) {
            let text = fs.read_to_string(&keyid_marker)?;
            return Ok(Resolution::Key(keys.key_for(text.trim())?));
        }
    }
    Err(CofferError::PolicyNotFound(path.to_path_buf()))
}

/// Find the symmetric key governing `path`, ignoring recipients markers.
/// Used by the smudge path for symmetric ciphertext: the content was
/// encrypted under a key-id policy, so only key-id markers are relevant.
pub fn resolve_key(path: &Path, fs: &dyn PolicyFs, keys: &dyn KeyStore) -> Result<SecretKey> {
    for dir in ancestor_dirs(path) {
        if !fs.is_dir(&dir) {
            continue;
        }
        let keyid_marker = dir.join(KEYID_FILENAME);
        if fs.is_file(&keyid_marker) {
            let text = fs.read_to_string(&keyid_marker)?;
            return keys.key_for(text.trim());
        }
    }
    Err(CofferError::PolicyNotFound(path.to_path_buf()))
}

// Directories containing `path`, nearest first. An empty component (the
// parent of a bare relative filename) means the current directory.
fn ancestor_dirs(path: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    path.ancestors().skip(1).map(|dir| {
        if dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            dir.to_path_buf()
        }
    })
}
