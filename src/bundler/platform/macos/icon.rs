//! Application icon (`.icns`) generation.

use crate::bundler::{builder::command::run_tool, error::Result, utils::fs};
use std::path::{Path, PathBuf};

/// Logo sizes shipped in `Contents/Resources/images`, smallest first.
const LOGO_SIZES: [u32; 6] = [16, 32, 64, 128, 256, 512];

/// Lists `(source logo, iconset file name)` pairs for `product`.
///
/// Each logo fills its own size slot; every logo after the smallest also
/// serves as the retina variant of the half size. The 1024px logo is the
/// retina variant of 512.
pub fn iconset_layout(product: &str) -> Vec<(String, String)> {
    let logo = |size: u32| format!("{product}-logo-{size}.png");
    let mut layout = Vec::new();

    for (i, size) in LOGO_SIZES.into_iter().enumerate() {
        layout.push((logo(size), format!("icon_{size}x{size}.png")));
        if i > 0 {
            let half = size / 2;
            layout.push((logo(size), format!("icon_{half}x{half}@2x.png")));
        }
    }
    layout.push((logo(1024), "icon_512x512@2x.png".to_string()));
    layout
}

/// Builds `<product>.icns` from the logos in `contents_dir` and installs it
/// under `Contents/Resources`.
///
/// The iconset is assembled in `work_dir`, where `iconutil` runs.
pub async fn make_icns(
    iconutil: &Path,
    product: &str,
    contents_dir: &Path,
    work_dir: &Path,
) -> Result<PathBuf> {
    let images = contents_dir.join("Resources/images");
    let iconset_name = format!("{product}.iconset");
    let iconset = work_dir.join(&iconset_name);
    fs::create_dir_all(&iconset, true).await?;

    for (source, name) in iconset_layout(product) {
        fs::copy_file(&images.join(source), &iconset.join(name)).await?;
    }

    log::info!("creating {product}.icns...");
    run_tool(iconutil, ["-c", "icns", iconset_name.as_str()], Some(work_dir)).await?;

    let icns = format!("{product}.icns");
    let dest = contents_dir.join("Resources").join(&icns);
    fs::copy_file(&work_dir.join(&icns), &dest).await?;
    Ok(dest)
}
