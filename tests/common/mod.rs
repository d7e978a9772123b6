use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::path::PathBuf;
use tempfile::TempDir;

use coffer::{Keyring, SecretKey};

/// Convenience helper for spawning the coffer binary via assert_cmd.
#[allow(dead_code)]
pub fn coffer_cmd() -> Command {
    cargo_bin_cmd!("coffer")
}

/// Absolute path to the coffer test binary.
#[allow(dead_code)]
pub fn coffer_bin() -> &'static str {
    env!("CARGO_BIN_EXE_coffer")
}

/// A scratch coffer home holding a keyring (and optionally an identity
/// file), pointed at via $COFFER_HOME.
pub struct TestHome {
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestHome {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp home"),
        }
    }

    pub fn keyring_path(&self) -> PathBuf {
        self.dir.path().join(".coffer_keyring")
    }

    pub fn identity_path(&self) -> PathBuf {
        self.dir.path().join(".coffer_identity")
    }

    /// Generate a key, store it in the keyring, and return it.
    pub fn add_key(&self, description: &str) -> SecretKey {
        let mut keyring = Keyring::load_or_default(&self.keyring_path()).unwrap();
        let key = SecretKey::generate();
        keyring.add(description, &key);
        keyring.save(&self.keyring_path()).unwrap();
        key
    }
}
