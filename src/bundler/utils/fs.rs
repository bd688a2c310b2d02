//! File system utilities for bundling.
//!
//! Provides copy operations that create parent directories, preserve
//! symlinks and file modification times, and report how many bytes were
//! written.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{io, path::Path};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        // Try removal, ignore NotFound (idempotent)
        match fs::remove_dir_all(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).fs_context("removing directory", path),
        }
    }

    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Makes a symbolic link.
#[cfg(unix)]
fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link.
#[cfg(windows)]
fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    if dst.is_dir() {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}

/// Copies the modification time of `from` onto `to`.
///
/// Best effort: a failure is logged and the copy keeps its fresh mtime.
fn preserve_mtime(from: &Path, to: &Path) {
    let result = std::fs::metadata(from)
        .and_then(|meta| meta.modified())
        .and_then(|mtime| std::fs::File::open(to)?.set_modified(mtime));
    if let Err(e) = result {
        log::debug!("could not keep mtime of {}: {}", from.display(), e);
    }
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Permission bits and the modification time travel with the copy. Fails if the source path is a
/// directory or doesn't exist. Returns the number of bytes copied.
pub async fn copy_file(from: &Path, to: &Path) -> Result<u64> {
    if !from.exists() {
        return Err(Error::GenericError(format!("{from:?} does not exist")));
    }
    if !from.is_file() {
        return Err(Error::GenericError(format!("{from:?} is not a file")));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    let copied = fs::copy(from, to).await.fs_context("copying file", from)?;

    let (from, to) = (from.to_path_buf(), to.to_path_buf());
    tokio::task::spawn_blocking(move || preserve_mtime(&from, &to))
        .await
        .map_err(|e| Error::GenericError(format!("File copy task panicked: {}", e)))?;
    Ok(copied)
}

/// Recursively copies a directory from one path to another, creating any
/// parent directories of the destination path as necessary.
///
/// Preserves symlinks and file modification times. Fails if the source path is not a directory or
/// doesn't exist. Returns the number of bytes copied.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<u64> {
    if !from.exists() {
        return Err(Error::GenericError(format!("{from:?} does not exist")));
    }
    if !from.is_dir() {
        return Err(Error::GenericError(format!("{from:?} is not a Directory")));
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<u64> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }

        let mut copied = 0;
        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry?;
            let rel_path = entry
                .path()
                .strip_prefix(&from)
                .map_err(|e| Error::GenericError(e.to_string()))?;
            let dest_path = to.join(rel_path);

            if entry.file_type().is_symlink() {
                let target =
                    std::fs::read_link(entry.path()).fs_context("reading link", entry.path())?;
                symlink(&target, &dest_path).fs_context("creating symlink", &dest_path)?;
            } else if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest_path)
                    .fs_context("creating directory", &dest_path)?;
            } else {
                copied += std::fs::copy(entry.path(), &dest_path)
                    .fs_context("copying file", entry.path())?;
                preserve_mtime(entry.path(), &dest_path);
            }
        }

        Ok(copied)
    })
    .await
    .map_err(|e| Error::GenericError(format!("Directory copy task panicked: {}", e)))?
}

/// Writes `contents` to `path` and marks it executable.
pub async fn write_executable(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)
        .await
        .fs_context("writing file", path)?;
    set_executable(path).await
}

/// Sets `rwxr-xr-x` on `path`.
pub async fn set_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .await
            .fs_context("setting permissions", path)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
