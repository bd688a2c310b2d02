//! Bundle configuration and entry point definitions.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// How an entry point's bootstrap script prepares the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPointKind {
    /// Full GTK environment plus the per-user D-Bus session daemon.
    Gui,
    /// Library path only; the program is exec'ed directly.
    Cli,
}

/// A user-visible program inside `Contents/MacOS`.
///
/// Every entry point gets a native shim under its own name, a hidden
/// bootstrap script `.<name>.sh` and the original binary moved to `.<name>.bin`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntryPoint {
    /// Program name as built, e.g. `ART-cli`.
    pub name: String,
    /// Runtime flavour of the bootstrap script.
    pub kind: EntryPointKind,
}

impl EntryPoint {
    /// Creates a new entry point.
    pub fn new(name: impl Into<String>, kind: EntryPointKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Hidden name of the companion bootstrap script.
    pub fn script_name(&self) -> String {
        format!(".{}.sh", self.name)
    }

    /// Hidden name the original binary is moved to.
    pub fn binary_name(&self) -> String {
        format!(".{}.bin", self.name)
    }

    /// Name of the compiled shim before it is installed.
    pub fn shim_name(&self) -> String {
        format!("{}_launch", self.name)
    }
}

/// Static description of the application being bundled.
///
/// Loaded from an optional TOML file; every field has a default matching ART.
///
/// ```toml
/// product_name = "ART"
/// identifier = "us.pixls.art.ART"
/// blacklist = ["/System/", "/usr/lib/"]
///
/// [[entry_points]]
/// name = "ART"
/// kind = "gui"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BundleConfig {
    /// Name of the main executable and of the `.app`.
    pub product_name: String,

    /// CFBundleIdentifier.
    pub identifier: String,

    /// Copyright notice placed in Info.plist.
    pub copyright: String,

    /// Library whose location reveals the runtime install prefix.
    pub marker_library: String,

    /// Dependency path prefixes that are never bundled.
    pub blacklist: Vec<String>,

    /// Location of the optional exiftool helper script.
    pub exiftool: PathBuf,

    /// Programs that receive launcher shims.
    pub entry_points: Vec<EntryPoint>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            product_name: "ART".into(),
            identifier: "us.pixls.art.ART".into(),
            copyright: "Copyright © 2004-2010 Gábor Horváth, 2010-2019 RawTherapee Development Team, 2019-2024 Alberto Griggio".into(),
            marker_library: "libgtk-3.0".into(),
            blacklist: vec!["/System/".into(), "/usr/lib/".into()],
            exiftool: PathBuf::from("/usr/local/bin/exiftool"),
            entry_points: vec![
                EntryPoint::new("ART", EntryPointKind::Gui),
                EntryPoint::new("ART-cli", EntryPointKind::Cli),
            ],
        }
    }
}

impl BundleConfig {
    /// Reads a configuration file.
    pub fn load(path: &Path) -> crate::bundler::Result<Self> {
        use crate::bundler::error::ErrorExt;

        let text = std::fs::read_to_string(path).fs_context("reading bundle config", path)?;
        Self::parse(&text)
    }

    /// Parses configuration text.
    pub fn parse(text: &str) -> crate::bundler::Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
