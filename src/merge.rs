//! Merge Driver: three-way merges over encrypted inputs.
//!
//! Git hands the driver three repository-form files (ancestor, current,
//! other). Each is smudged into a scoped temporary plaintext copy, an
//! encryption-unaware line-merge tool runs over the copies, and the result
//! overwrites the current path in plaintext, since the merge driver
//! contract expects the working file to end up readable. The driver's exit
//! status mirrors the tool's own contract: 0 for a clean merge, the conflict
//! count (capped by the tool at 127) otherwise, and a -1 sentinel for any
//! internal failure, which git distinguishes from a mere conflict.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::NamedTempFile;
use tracing::error;

use crate::config::Config;
use crate::error::{CofferError, Result};
use crate::filter;

/// Exit status for failures inside the driver itself. Distinct from every
/// valid conflict count; becomes process status 255, which git treats as a
/// crashed driver rather than a conflicted merge.
pub const INTERNAL_ERROR: i32 = -1;

/// The eight positional arguments git passes to the driver:
/// `%O %A %B %L %P %S %X %Y`. `%P` (the pathname placeholder) is accepted
/// and ignored; `%A` is both an input and the output target.
#[derive(Debug)]
pub struct MergeRequest {
    pub base: PathBuf,
    pub current: PathBuf,
    pub other: PathBuf,
    pub marker_size: String,
    pub labels: [String; 3],
}

impl MergeRequest {
    pub fn from_args(args: &[String]) -> Result<Self> {
        if args.len() != 8 {
            return Err(CofferError::MalformedMergeArguments(args.len()));
        }
        Ok(Self {
            base: PathBuf::from(&args[0]),
            current: PathBuf::from(&args[1]),
            other: PathBuf::from(&args[2]),
            marker_size: args[3].clone(),
            labels: [args[5].clone(), args[6].clone(), args[7].clone()],
        })
    }
}

/// Raw result of a merge tool run that at least started.
pub struct ToolOutput {
    /// Exit code, or `None` when the tool was killed by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Three-way textual merge capability. The default shells out to
/// `git merge-file`; alternatives (an embedded merge algorithm, a test
/// double) plug in here.
pub trait MergeTool {
    fn merge(
        &self,
        current: &Path,
        base: &Path,
        other: &Path,
        marker_size: &str,
        labels: &[String; 3],
    ) -> io::Result<ToolOutput>;
}

pub struct GitMergeFile;

impl MergeTool for GitMergeFile {
    fn merge(
        &self,
        current: &Path,
        base: &Path,
        other: &Path,
        marker_size: &str,
        labels: &[String; 3],
    ) -> io::Result<ToolOutput> {
        let output = Command::new("git")
            .arg("merge-file")
            .arg(format!("--marker-size={marker_size}"))
            .arg("--stdout")
            .args(["-L", &labels[0]])
            .args(["-L", &labels[1]])
            .args(["-L", &labels[2]])
            .arg(current)
            .arg(base)
            .arg(other)
            .output()?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Run the merge. Returns the process exit status for the driver; never
/// panics and never leaves temporaries behind (the [`NamedTempFile`] handles
/// remove their files on every return path).
pub fn run(request: &MergeRequest, cfg: &Config, tool: &dyn MergeTool) -> i32 {
    let temp_base = match materialize(&request.base, cfg) {
        Ok(temp) => temp,
        Err(err) => {
            error!(path = %request.base.display(), %err, "failed to materialize merge input");
            return INTERNAL_ERROR;
        }
    };
    let temp_current = match materialize(&request.current, cfg) {
        Ok(temp) => temp,
        Err(err) => {
            error!(path = %request.current.display(), %err, "failed to materialize merge input");
            return INTERNAL_ERROR;
        }
    };
    let temp_other = match materialize(&request.other, cfg) {
        Ok(temp) => temp,
        Err(err) => {
            error!(path = %request.other.display(), %err, "failed to materialize merge input");
            return INTERNAL_ERROR;
        }
    };

    let output = match tool.merge(
        temp_current.path(),
        temp_base.path(),
        temp_other.path(),
        &request.marker_size,
        &request.labels,
    ) {
        Ok(output) => output,
        Err(err) => {
            error!(%err, "failed to run merge tool");
            return INTERNAL_ERROR;
        }
    };

    // write the merged result (possibly with conflict markers) if produced
    if !output.stdout.is_empty() {
        if let Err(err) = fs::write(&request.current, &output.stdout) {
            error!(path = %request.current.display(), %err, "failed to write merged file");
            return INTERNAL_ERROR;
        }
    }

    match output.code {
        Some(0) => 0,
        Some(code) => {
            // conflicts: surface the tool's diagnostics and mirror its code
            println!("{}", String::from_utf8_lossy(&output.stderr));
            code
        }
        None => {
            error!(
                stderr = %String::from_utf8_lossy(&output.stderr),
                "merge tool terminated abnormally"
            );
            INTERNAL_ERROR
        }
    }
}

// Smudge a repository-form input into a scoped plaintext temp file.
fn materialize(path: &Path, cfg: &Config) -> Result<NamedTempFile> {
    let plaintext = filter::smudge_file(path, cfg)?;
    let mut temp = tempfile::Builder::new()
        .prefix("coffer-merge-")
        .tempfile()?;
    temp.write_all(&plaintext)?;
    temp.flush()?;
    Ok(temp)
}
