use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CofferError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("age error: {0}")]
    Age(String),

    #[error("Invalid key format")]
    InvalidKeyFormat,

    #[error("Key not found in keyring: {0}")]
    KeyNotFound(String),

    #[error("no recipients or key-id found for {}", .0.display())]
    PolicyNotFound(PathBuf),

    #[error("Invalid key override: {0}")]
    InvalidKeyOverride(String),

    #[error("Keyring error: {0}")]
    Keyring(String),

    #[error("Identity file not found: {}", .0.display())]
    IdentityNotFound(PathBuf),

    #[error("expected 8 merge-file arguments, got {0}")]
    MalformedMergeArguments(usize),

    #[error("could not determine home directory: set $COFFER_HOME or $HOME")]
    HomeNotFound,

    #[error("{0} file(s) failed to decrypt")]
    DecryptTree(usize),
}

pub type Result<T> = std::result::Result<T, CofferError>;
