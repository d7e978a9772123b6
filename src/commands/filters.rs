//! The filter entry points git invokes once per file: content on stdin,
//! path as argument, transformed content on stdout. Diagnostics go to
//! stderr only; stdout belongs to the filter contract.

use std::io::{self, Read, Write};
use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::filter;

/// Clean filter (called by git during add/commit).
pub fn clean(path: &Path, cfg: &Config) -> Result<()> {
    let mut input = Vec::new();
    io::stdin().read_to_end(&mut input)?;

    let output = filter::clean(&input, path, cfg)?;
    io::stdout().write_all(&output)?;

    Ok(())
}

/// Smudge filter (called by git during checkout).
pub fn smudge(path: &Path, cfg: &Config) -> Result<()> {
    let mut input = Vec::new();
    io::stdin().read_to_end(&mut input)?;

    let output = filter::smudge(&input, path, cfg)?;
    io::stdout().write_all(&output)?;

    Ok(())
}

/// Diff textconv (called by git during diff): emit the working-tree form of
/// a repository-form file, with the same fallbacks as smudge.
pub fn diff(path: &Path, cfg: &Config) -> Result<()> {
    let output = filter::smudge_file(path, cfg)?;
    io::stdout().write_all(&output)?;

    Ok(())
}
