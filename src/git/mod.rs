pub mod log_parser;

use crate::error::{Result, TimesheetError};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Resolves the repository root for `path` via `git rev-parse --show-toplevel`.
pub fn locate_repo_root(path: &Path) -> Result<PathBuf> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(path)
        .output()
        .map_err(|e| TimesheetError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        return Err(TimesheetError::NotARepository(path.display().to_string()));
    }

    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(PathBuf::from(root))
}
