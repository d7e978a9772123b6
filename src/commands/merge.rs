use crate::config::Config;
use crate::error::Result;
use crate::merge::{self, GitMergeFile, MergeRequest};

/// Merge driver entry point. Returns the process exit status: the merge
/// tool's own code on a normal run, -1 on internal failure. Argument-count
/// validation happens before any file is touched.
pub fn merge_file(args: &[String], cfg: &Config) -> Result<i32> {
    let request = MergeRequest::from_args(args)?;
    Ok(merge::run(&request, cfg, &GitMergeFile))
}
