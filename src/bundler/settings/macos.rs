//! macOS external tool and disk image settings.

use std::path::PathBuf;

/// External programs invoked during a run.
///
/// Each one can be replaced (e.g. by a wrapper script) through the CLI or
/// the matching `BUNDLER_*` environment variable.
#[derive(Clone, Debug)]
pub struct ToolSettings {
    /// Dependency probe, invoked as `otool -L <file>`.
    pub otool: PathBuf,

    /// Icon composer, invoked as `iconutil -c icns <name>.iconset`.
    pub iconutil: PathBuf,

    /// C compiler used for launcher shims, invoked as `cc <src> -o <out>`.
    pub cc: PathBuf,

    /// Disk image tool, invoked as `hdiutil create ...`.
    pub hdiutil: PathBuf,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            otool: "otool".into(),
            iconutil: "iconutil".into(),
            cc: "clang".into(),
            hdiutil: "hdiutil".into(),
        }
    }
}

/// macOS DMG disk image configuration.
///
/// Presence of this struct in [`Settings`](super::Settings) means packaging
/// was requested.
#[derive(Clone, Debug)]
pub struct DmgSettings {
    /// Volume name; the image is written as `<volume_name>.dmg` next to the `.app`.
    pub volume_name: String,
}

impl DmgSettings {
    /// File name of the produced image.
    pub fn file_name(&self) -> String {
        format!("{}.dmg", self.volume_name)
    }
}
