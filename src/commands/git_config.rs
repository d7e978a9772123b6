use crate::error::Result;
use crate::git;

/// Configure git globally for coffer use.
pub fn git_config() -> Result<()> {
    git::configure_git()?;
    println!("git global configuration updated successfully");
    Ok(())
}
