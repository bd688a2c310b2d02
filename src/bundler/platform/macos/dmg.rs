//! macOS DMG disk image creation using the native hdiutil tool.

use crate::bundler::{
    BundledArtifact,
    builder::{checksum::calculate_sha256, command::run_tool},
    error::{Context, ErrorExt, Result},
    settings::DmgSettings,
};
use std::ffi::OsStr;
use std::path::Path;
use tokio::fs::remove_file;

/// Packages `app_dir` into a bzip2-compressed HFS+ image next to it.
///
/// `hdiutil` runs in the directory containing the `.app`, so the image is
/// written as `<volume_name>.dmg` beside the bundle. A stale image of the
/// same name is removed first.
pub async fn create_dmg(
    hdiutil: &Path,
    app_dir: &Path,
    dmg: &DmgSettings,
) -> Result<BundledArtifact> {
    let output_dir = app_dir
        .parent()
        .context("app bundle has no parent directory")?;
    let app_name = app_dir
        .file_name()
        .context("invalid app bundle path")?;
    let file_name = dmg.file_name();
    let dmg_path = output_dir.join(&file_name);

    if dmg_path.exists() {
        remove_file(&dmg_path)
            .await
            .fs_context("removing old disk image", &dmg_path)?;
    }

    log::info!("creating dmg in {} ...", dmg_path.display());
    run_tool(
        hdiutil,
        [
            OsStr::new("create"),
            OsStr::new("-format"),
            OsStr::new("UDBZ"),
            OsStr::new("-fs"),
            OsStr::new("HFS+"),
            OsStr::new("-srcdir"),
            app_name,
            OsStr::new("-volname"),
            OsStr::new(&dmg.volume_name),
            OsStr::new(&file_name),
        ],
        Some(output_dir),
    )
    .await?;

    let size = tokio::fs::metadata(&dmg_path)
        .await
        .fs_context("reading disk image metadata", &dmg_path)?
        .len();
    let checksum = calculate_sha256(&dmg_path).await?;
    log::info!("created {} ({} bytes, sha256 {})", dmg_path.display(), size, checksum);

    Ok(BundledArtifact {
        path: dmg_path,
        size,
        checksum,
    })
}
