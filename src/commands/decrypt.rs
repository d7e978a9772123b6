use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::config::Config;
use crate::crypto::SecretKey;
use crate::error::{CofferError, Result};
use crate::walk;

/// Decrypt a single file (or stdin) with an explicit key, or a whole tree
/// with `--recursive`.
pub fn decrypt(
    path: Option<&Path>,
    key: Option<&str>,
    recursive: bool,
    cfg: &Config,
) -> Result<()> {
    if recursive {
        let target = match path {
            Some(path) => path.to_path_buf(),
            None => env::current_dir()?,
        };
        return walk::decrypt_tree(&target, key, cfg);
    }

    // the CLI requires --key for single-file decryption
    let Some(key) = key else {
        return Err(CofferError::InvalidKeyOverride(
            "--key is required without --recursive".into(),
        ));
    };
    let key = SecretKey::decode(key).map_err(|_| CofferError::InvalidKeyOverride(key.to_string()))?;

    let input = match path {
        Some(path) => fs::read(path)?,
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            buffer
        }
    };

    let plaintext = key.decrypt(&input)?;
    io::stdout().write_all(&plaintext)?;

    Ok(())
}
