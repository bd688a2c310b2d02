//! Builder for constructing Settings.

use super::{BundleConfig, DmgSettings, Settings, ToolSettings};
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// # Examples
///
/// ```no_run
/// use art_bundler::bundler::{DmgSettings, SettingsBuilder};
///
/// # fn example() -> art_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .out_directory("dist")
///     .exiftool(true)
///     .dmg(DmgSettings { volume_name: "ART".into() })
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    config: BundleConfig,
    source_directory: Option<PathBuf>,
    out_directory: Option<PathBuf>,
    rpath: Vec<PathBuf>,
    prefix: Option<PathBuf>,
    exiftool: bool,
    lensfun_database: Option<Option<PathBuf>>,
    shell: Option<PathBuf>,
    dmg: Option<DmgSettings>,
    tools: ToolSettings,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the application description.
    ///
    /// Default: [`BundleConfig::default`]
    pub fn config(mut self, config: BundleConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the application build tree.
    ///
    /// Default: the current directory
    pub fn source_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output directory.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn out_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.out_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the rpath search directories.
    pub fn rpath(mut self, dirs: Vec<PathBuf>) -> Self {
        self.rpath = dirs;
        self
    }

    /// Overrides the install prefix.
    pub fn prefix(mut self, prefix: Option<PathBuf>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Enables bundling of the exiftool helper.
    pub fn exiftool(mut self, enabled: bool) -> Self {
        self.exiftool = enabled;
        self
    }

    /// Sets the lensfun database directory.
    ///
    /// Default: `~/.local/share/lensfun/updates/version_1`
    pub fn lensfun_database(mut self, path: Option<PathBuf>) -> Self {
        self.lensfun_database = Some(path);
        self
    }

    /// Sets the shell interpreter copied into the bundle.
    ///
    /// Default: `/bin/sh`
    pub fn shell<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.shell = Some(path.as_ref().to_path_buf());
        self
    }

    /// Requests a disk image.
    pub fn dmg(mut self, dmg: DmgSettings) -> Self {
        self.dmg = Some(dmg);
        self
    }

    /// Sets the external tools.
    pub fn tools(mut self, tools: ToolSettings) -> Self {
        self.tools = tools;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `out_directory` is missing or the configuration
    /// names no entry points.
    pub fn build(self) -> crate::bundler::Result<Settings> {
        use crate::bundler::error::Context;

        let out_directory = self
            .out_directory
            .context("out_directory is required")?;

        if self.config.product_name.is_empty() {
            crate::bail!("product_name cannot be empty");
        }
        if self.config.entry_points.is_empty() {
            crate::bail!("at least one entry point is required");
        }

        let lensfun_database = self.lensfun_database.unwrap_or_else(|| {
            dirs::home_dir().map(|home| home.join(".local/share/lensfun/updates/version_1"))
        });

        Ok(Settings::new(
            self.config,
            self.source_directory.unwrap_or_else(|| PathBuf::from(".")),
            out_directory,
            self.rpath,
            self.prefix,
            self.exiftool,
            lensfun_database,
            self.shell.unwrap_or_else(|| PathBuf::from("/bin/sh")),
            self.dmg,
            self.tools,
        ))
    }
}
