//! Main bundler orchestration and coordination.
//!
//! This module provides the [`Bundler`] orchestrator that turns an
//! application build tree into a self-contained `.app`.

use crate::bundler::{
    BundleReport, Result, Settings,
    error::{Error, ErrorExt},
    platform::macos::{
        dmg,
        dylib::{self, DependencyProbe, Otool},
        icon, info_plist,
        launcher::{self, SHELL_NAME},
        prefix::resolve_prefix,
        resources::{self, ManifestOptions},
    },
    utils::fs,
};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Contents of the default GTK settings file installed in the bundle.
const GTK_SETTINGS: &str =
    "[Settings]\ngtk-primary-button-warps-slider = true\ngtk-overlay-scrolling = true\n";

/// Section appended to the application's options file.
const LENSFUN_OPTIONS: &str = "\n[Lensfun]\nDBDirectory=lensfun\n";

/// Main bundler orchestrator.
///
/// Runs every step strictly in sequence: a step only starts once the
/// previous one has finished. Structural problems abort the run; copy
/// problems are collected as warnings in the returned [`BundleReport`].
/// A failed run leaves its partial output in place.
///
/// # Examples
///
/// ```no_run
/// use art_bundler::bundler::{Bundler, Settings};
///
/// # async fn example(settings: Settings) -> art_bundler::bundler::Result<()> {
/// let report = Bundler::new(settings).bundle().await?;
/// println!("bundled {} libraries", report.libraries.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Bundler {
    settings: Settings,
}

impl Bundler {
    /// Creates a new bundler with the given settings.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Returns a reference to the bundler settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs the whole pipeline using the configured `otool` as dependency probe.
    ///
    /// The source tree is validated before the probe is looked up, so a
    /// missing build is reported as such even on hosts without `otool`.
    pub async fn bundle(&self) -> Result<BundleReport> {
        self.check_preconditions()?;
        let otool = Otool::locate(&self.settings.tools().otool)?;
        self.bundle_with_probe(&otool).await
    }

    /// Runs the whole pipeline with an explicit dependency probe.
    pub async fn bundle_with_probe<P: DependencyProbe + ?Sized>(
        &self,
        probe: &P,
    ) -> Result<BundleReport> {
        let settings = &self.settings;
        self.check_preconditions()?;

        let app_dir = settings.app_dir();
        let contents = app_dir.join("Contents");
        let macos_dir = contents.join("MacOS");
        let source_exe = settings.source_executable();
        let mut report = BundleReport {
            app_dir: app_dir.clone(),
            ..Default::default()
        };

        log::info!(
            "copying {} to {}",
            settings.source_directory().display(),
            app_dir.display()
        );
        copy_source_tree(settings.source_directory(), &app_dir).await?;

        let prefix = match settings.prefix() {
            Some(prefix) => prefix.to_path_buf(),
            None => self.discover_prefix(probe, &source_exe)?,
        };
        log::info!("using install prefix {}", prefix.display());

        let mut roots = vec![source_exe.clone()];
        let daemon = prefix.join("bin/dbus-daemon");
        if daemon.is_file() {
            roots.push(daemon);
        } else {
            log::warn!("{} not found, its libraries are not bundled", daemon.display());
        }
        let libraries = dylib::scan(
            probe,
            &roots,
            settings.rpath(),
            settings.blacklist(),
        )?;
        log::info!("found {} libraries", libraries.len());
        report.libraries = dylib::bundle_libraries(
            &libraries,
            &contents.join("Frameworks"),
            &mut report.warnings,
        )
        .await?;

        {
            let temp_dir = tempfile::Builder::new()
                .prefix("art-bundler")
                .tempdir()
                .fs_context("creating temporary directory", std::env::temp_dir())?;
            let work_dir = temp_dir.path();

            let options = ManifestOptions {
                exiftool: settings.exiftool().map(Path::to_path_buf),
                lensfun_database: settings.lensfun_database().map(Path::to_path_buf),
            };
            let entries = resources::build(&prefix, &options);
            let applied = resources::apply(&entries, &contents).await;
            log::info!(
                "copied {} bytes of resources ({} skipped)",
                applied.total_bytes(),
                applied.warnings.len()
            );
            report.warnings.extend(applied.warnings);

            info_plist::write(settings.config(), &contents)?;
            icon::make_icns(
                &settings.tools().iconutil,
                settings.product_name(),
                &contents,
                work_dir,
            )
            .await?;

            for entry in settings.entry_points() {
                launcher::synthesize(entry, work_dir, &macos_dir, &settings.tools().cc).await?;
                launcher::write_bootstrap_script(entry, settings.product_name(), &macos_dir)
                    .await?;
            }
            // temp_dir is removed here, and on every early return above.
        }

        self.install_launchers(&macos_dir).await?;
        self.apply_touch_ups(&contents).await?;

        if let Some(dmg_settings) = settings.dmg() {
            report.artifact =
                Some(dmg::create_dmg(&settings.tools().hdiutil, &app_dir, dmg_settings).await?);
        }

        log::info!(
            "bundled {} with {} warning(s)",
            app_dir.display(),
            report.warnings.len()
        );
        Ok(report)
    }

    fn check_preconditions(&self) -> Result<()> {
        let source_exe = self.settings.source_executable();
        if !source_exe.is_file() {
            return Err(Error::MissingSourceTree { path: source_exe });
        }
        let app_dir = self.settings.app_dir();
        if app_dir.exists() {
            return Err(Error::DestinationExists(app_dir));
        }
        Ok(())
    }

    /// Probes the root executable once and derives the prefix from its
    /// unfiltered, rpath-resolved dependency list.
    fn discover_prefix<P: DependencyProbe + ?Sized>(
        &self,
        probe: &P,
        executable: &Path,
    ) -> Result<PathBuf> {
        let entries: Vec<String> = probe
            .dependencies(&executable.to_string_lossy())?
            .iter()
            .map(|entry| dylib::resolve_relocatable(entry, self.settings.rpath()))
            .collect();
        resolve_prefix(&entries, &self.settings.config().marker_library)
    }

    /// Moves each original binary to its hidden name and puts the shim in
    /// its place, then installs the interpreter the shims exec.
    async fn install_launchers(&self, macos_dir: &Path) -> Result<()> {
        for entry in self.settings.entry_points() {
            let visible = macos_dir.join(&entry.name);
            let hidden = macos_dir.join(entry.binary_name());
            let shim = macos_dir.join(entry.shim_name());

            tokio::fs::rename(&visible, &hidden)
                .await
                .fs_context("hiding original binary", &visible)?;
            tokio::fs::rename(&shim, &visible)
                .await
                .fs_context("installing launcher", &shim)?;
            log::debug!("installed launcher {}", visible.display());
        }

        let shell = macos_dir.join(SHELL_NAME);
        fs::copy_file(self.settings.shell(), &shell).await?;
        fs::set_executable(&shell).await
    }

    async fn apply_touch_ups(&self, contents: &Path) -> Result<()> {
        let settings_ini = contents.join("Resources/share/gtk-3.0/settings.ini");
        if let Some(parent) = settings_ini.parent() {
            fs::create_dir_all(parent, false).await?;
        }
        tokio::fs::write(&settings_ini, GTK_SETTINGS)
            .await
            .fs_context("writing GTK settings", &settings_ini)?;

        let options = contents.join("Resources/options");
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&options)
            .await
            .fs_context("opening options file", &options)?;
        file.write_all(LENSFUN_OPTIONS.as_bytes())
            .await
            .fs_context("updating options file", &options)?;
        Ok(())
    }
}

/// Copies every entry of `source` into `dest`.
///
/// An entry that contains `dest` (an output directory placed inside the
/// build tree) is skipped so the copy never walks into its own output.
async fn copy_source_tree(source: &Path, dest: &Path) -> Result<u64> {
    fs::create_dir_all(dest, false).await?;
    let dest_abs = tokio::fs::canonicalize(dest)
        .await
        .fs_context("resolving output directory", dest)?;

    let mut copied = 0;
    let mut dir = tokio::fs::read_dir(source)
        .await
        .fs_context("reading source tree", source)?;
    while let Some(child) = dir
        .next_entry()
        .await
        .fs_context("reading source tree", source)?
    {
        let path = child.path();
        let child_abs = tokio::fs::canonicalize(&path)
            .await
            .fs_context("resolving source entry", &path)?;
        if dest_abs.starts_with(&child_abs) {
            log::debug!("not copying {} (contains the output)", path.display());
            continue;
        }

        let target = dest.join(child.file_name());
        copied += if child_abs.is_dir() {
            fs::copy_dir(&path, &target).await?
        } else {
            fs::copy_file(&path, &target).await?
        };
    }
    Ok(copied)
}
