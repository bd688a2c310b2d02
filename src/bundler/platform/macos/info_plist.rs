//! Info.plist generation.

use crate::bundler::{error::Result, settings::BundleConfig};
use plist::{Dictionary, Value};
use std::path::Path;

/// Version recorded when the build tree carries no version line.
pub const UNKNOWN_VERSION: &str = "UNKNOWN";

/// Extracts the version from the build's `AboutThisBuild.txt`.
///
/// The last word of the first line starting with `Version: ` is used. A
/// missing or unreadable file yields [`UNKNOWN_VERSION`].
pub fn read_version(about_file: &Path) -> String {
    let Ok(text) = std::fs::read_to_string(about_file) else {
        log::debug!("{} not readable, version unknown", about_file.display());
        return UNKNOWN_VERSION.to_string();
    };

    text.lines()
        .filter(|line| line.starts_with("Version: "))
        .find_map(|line| line.split_whitespace().last())
        .unwrap_or(UNKNOWN_VERSION)
        .to_string()
}

/// Builds the Info.plist dictionary for `config` at `version`.
pub fn build(config: &BundleConfig, version: &str) -> Dictionary {
    let product = &config.product_name;
    let string = |s: String| Value::String(s);

    let mut dict = Dictionary::new();
    dict.insert("CFBundleExecutable".into(), string(product.clone()));
    dict.insert(
        "CFBundleGetInfoString".into(),
        string(format!("{}, {}", version, config.copyright)),
    );
    dict.insert("CFBundleIconFile".into(), string(format!("{product}.icns")));
    dict.insert("CFBundleIdentifier".into(), string(config.identifier.clone()));
    dict.insert("CFBundleInfoDictionaryVersion".into(), string("6.0".into()));
    dict.insert("CFBundleName".into(), string(product.clone()));
    dict.insert("CFBundlePackageType".into(), string("APPL".into()));
    dict.insert("CFBundleShortVersionString".into(), string(version.into()));
    dict.insert("CFBundleSignature".into(), string("????".into()));
    dict.insert("CFBundleVersion".into(), string(version.into()));
    dict.insert("NSHighResolutionCapable".into(), Value::Boolean(true));
    dict.insert(
        "NSHumanReadableCopyright".into(),
        string(config.copyright.clone()),
    );
    dict.insert("LSMultipleInstancesProhibited".into(), Value::Boolean(true));

    for (key, place) in [
        ("NSDesktopFolderUsageDescription", "the Desktop folder"),
        ("NSDocumentsFolderUsageDescription", "the Documents folder"),
        ("NSDownloadsFolderUsageDescription", "the Downloads folder"),
        ("NSRemovableVolumesUsageDescription", "files on Removable Volumes"),
    ] {
        dict.insert(
            key.into(),
            string(format!("{product} requires permission to access {place}.")),
        );
    }

    dict
}

/// Writes `Contents/Info.plist` as XML and returns the version used.
pub fn write(config: &BundleConfig, contents_dir: &Path) -> Result<String> {
    let version = read_version(&contents_dir.join("Resources/AboutThisBuild.txt"));
    let path = contents_dir.join("Info.plist");
    log::info!("writing {} (version {})", path.display(), version);
    Value::Dictionary(build(config, &version)).to_file_xml(&path)?;
    Ok(version)
}
