//! Runtime install prefix discovery.

use crate::bundler::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Finds the install prefix from the unfiltered dependencies of the main executable.
///
/// The first entry containing `marker` (e.g. `libgtk-3.0`) wins; the prefix
/// is the directory two levels above it, so `/opt/local/lib/libgtk-3.0.0.dylib`
/// yields `/opt/local`.
pub fn resolve_prefix<S: AsRef<str>>(entries: &[S], marker: &str) -> Result<PathBuf> {
    for entry in entries {
        let lib = Path::new(entry.as_ref());
        if !entry.as_ref().contains(marker) {
            continue;
        }
        if let Some(prefix) = lib.parent().and_then(Path::parent) {
            log::debug!("install prefix {} (from {})", prefix.display(), lib.display());
            return Ok(prefix.to_path_buf());
        }
    }

    Err(Error::PrefixNotFound {
        marker: marker.to_string(),
    })
}
