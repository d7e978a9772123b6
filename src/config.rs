//! Per-invocation configuration.
//!
//! A `Config` is built once at process start from the CLI flags and passed by
//! reference into every component; nothing reads the environment after this
//! point. Filter invocations are independent short-lived processes, so there
//! is no cached state to invalidate between runs.

use std::env;
use std::path::PathBuf;

use crate::error::{CofferError, Result};
use crate::keyring::{IDENTITY_FILENAME, KEYRING_FILENAME};

pub const HOME_ENV: &str = "COFFER_HOME";

#[derive(Debug, Clone)]
pub struct Config {
    pub keyring_path: PathBuf,
    pub identity_path: PathBuf,
}

impl Config {
    /// Resolve the key material locations: explicit flags win, otherwise the
    /// default filenames under the derived home directory.
    pub fn resolve(keyring: Option<PathBuf>, identity: Option<PathBuf>) -> Result<Self> {
        let home = derive_home()?;
        Ok(Self {
            keyring_path: keyring.unwrap_or_else(|| home.join(KEYRING_FILENAME)),
            identity_path: identity.unwrap_or_else(|| home.join(IDENTITY_FILENAME)),
        })
    }
}

/// `$COFFER_HOME`, then `$HOME`, then the platform home directory.
fn derive_home() -> Result<PathBuf> {
    if let Some(home) = env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    if let Some(home) = env::var_os("HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir().ok_or(CofferError::HomeNotFound)
}
