//! External tool availability checking.

use crate::bundler::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Finds `program` on PATH, or checks it directly when it contains a separator.
///
/// Returns a human readable reason on failure so callers can wrap it in the
/// error variant matching the tool's role.
pub fn locate(program: &Path) -> std::result::Result<PathBuf, String> {
    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program.display(), path.display());
            Ok(path)
        }
        Err(e) => Err(format!("{} not found: {}", program.display(), e)),
    }
}

/// Like [`locate`], failing with [`Error::ToolInvocationFailure`].
pub fn require(program: &Path) -> Result<PathBuf> {
    locate(program).map_err(|reason| Error::ToolInvocationFailure {
        tool: program.display().to_string(),
        reason,
    })
}
