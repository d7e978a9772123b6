//! Git configuration wiring.
//!
//! Registers the coffer filter, diff, and merge drivers in the user-global
//! git configuration. Repositories opt in per path via `.gitattributes`:
//!
//! ```text
//! secrets/** filter=coffer diff=coffer merge=coffer
//! ```

use std::path::Path;

use crate::error::{CofferError, Result};

/// Configure git globally for coffer use. Creates `~/.gitconfig` if needed.
pub fn configure_git() -> Result<()> {
    let home = dirs::home_dir().ok_or(CofferError::HomeNotFound)?;
    configure_at(&home.join(".gitconfig"))
}

/// Write the driver entries into the given git config file.
pub fn configure_at(path: &Path) -> Result<()> {
    let mut config = git2::Config::open(path)?;

    // clean/smudge filters (encrypt on add, decrypt on checkout)
    config.set_str("filter.coffer.clean", "coffer clean %f")?;
    config.set_str("filter.coffer.smudge", "coffer smudge %f")?;
    config.set_bool("filter.coffer.required", true)?;

    // readable diffs of encrypted content
    config.set_str("diff.coffer.textconv", "coffer diff")?;

    // three-way merges over encrypted content
    config.set_str(
        "merge.coffer.driver",
        "coffer merge-file %O %A %B %L %P %S %X %Y",
    )?;

    Ok(())
}
