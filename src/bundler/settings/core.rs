//! Core Settings struct and implementations.

use super::{BundleConfig, DmgSettings, EntryPoint, ToolSettings};
use std::path::{Path, PathBuf};

/// Main settings for a bundling run.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder).
///
/// # Examples
///
/// ```no_run
/// use art_bundler::bundler::SettingsBuilder;
///
/// # fn example() -> art_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .source_directory("build/ART.app")
///     .out_directory("dist")
///     .rpath(vec!["/opt/local/lib".into()])
///     .build()?;
/// assert!(settings.app_dir().ends_with("ART.app"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// Application description.
    config: BundleConfig,

    /// Built application tree (the directory holding `Contents/`).
    source_directory: PathBuf,

    /// Directory receiving `<product>.app` and the disk image.
    out_directory: PathBuf,

    /// Candidate directories for `@rpath/` references, tried in order.
    rpath: Vec<PathBuf>,

    /// Install prefix override; resolved from the main executable when absent.
    prefix: Option<PathBuf>,

    /// Bundle the exiftool helper if it exists on disk.
    exiftool: bool,

    /// Lensfun database copied into Resources, if any.
    lensfun_database: Option<PathBuf>,

    /// Shell interpreter copied into the bundle for the bootstrap scripts.
    shell: PathBuf,

    /// Packaging configuration; `None` skips the disk image.
    dmg: Option<DmgSettings>,

    /// External programs.
    tools: ToolSettings,
}

impl Settings {
    /// Returns the product name.
    pub fn product_name(&self) -> &str {
        &self.config.product_name
    }

    /// Returns the application description.
    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Returns the application build tree.
    pub fn source_directory(&self) -> &Path {
        &self.source_directory
    }

    /// Returns the output directory.
    pub fn out_directory(&self) -> &Path {
        &self.out_directory
    }

    /// Path of the `.app` being assembled.
    pub fn app_dir(&self) -> PathBuf {
        self.out_directory
            .join(format!("{}.app", self.config.product_name))
    }

    /// Main executable inside the build tree; its presence is the run's precondition.
    pub fn source_executable(&self) -> PathBuf {
        self.source_directory
            .join("Contents/MacOS")
            .join(&self.config.product_name)
    }

    /// Returns the rpath search directories.
    pub fn rpath(&self) -> &[PathBuf] {
        &self.rpath
    }

    /// Returns the dependency blacklist.
    pub fn blacklist(&self) -> &[String] {
        &self.config.blacklist
    }

    /// Returns the install prefix override.
    pub fn prefix(&self) -> Option<&Path> {
        self.prefix.as_deref()
    }

    /// Returns the exiftool script to bundle, when enabled.
    pub fn exiftool(&self) -> Option<&Path> {
        self.exiftool.then_some(self.config.exiftool.as_path())
    }

    /// Returns the lensfun database directory.
    pub fn lensfun_database(&self) -> Option<&Path> {
        self.lensfun_database.as_deref()
    }

    /// Returns the shell interpreter.
    pub fn shell(&self) -> &Path {
        &self.shell
    }

    /// Returns the entry points.
    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.config.entry_points
    }

    /// Returns the packaging settings.
    pub fn dmg(&self) -> Option<&DmgSettings> {
        self.dmg.as_ref()
    }

    /// Returns the external tools.
    pub fn tools(&self) -> &ToolSettings {
        &self.tools
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        config: BundleConfig,
        source_directory: PathBuf,
        out_directory: PathBuf,
        rpath: Vec<PathBuf>,
        prefix: Option<PathBuf>,
        exiftool: bool,
        lensfun_database: Option<PathBuf>,
        shell: PathBuf,
        dmg: Option<DmgSettings>,
        tools: ToolSettings,
    ) -> Self {
        Self {
            config,
            source_directory,
            out_directory,
            rpath,
            prefix,
            exiftool,
            lensfun_database,
            shell,
            dmg,
            tools,
        }
    }
}
