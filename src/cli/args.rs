//! Command line argument parsing and validation.

use crate::bundler::{BundleConfig, DmgSettings, Settings, SettingsBuilder, ToolSettings};
use clap::Parser;
use std::path::PathBuf;

/// macOS application bundler for GTK programs
#[derive(Parser, Debug)]
#[command(
    name = "art_bundler",
    version,
    about = "Bundles a GTK application build tree into a self-contained macOS .app",
    long_about = "Bundles a GTK application build tree into a self-contained macOS .app.

Copies the build tree, collects every non-system dylib it links against, adds the
GTK runtime assets, installs launcher shims and optionally packages a DMG.

Usage:
  art_bundler -o dist
  art_bundler --source build -o dist -e -r /opt/local/lib --dmg-name ART-1.25

Exit code 0 = the bundle was assembled (warnings may have been logged)."
)]
pub struct Args {
    /// Directory receiving `<product>.app` (and the DMG)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub outdir: PathBuf,

    /// Application build tree containing `Contents/MacOS/<product>`
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub source: PathBuf,

    /// Bundle exiftool and its library directory
    #[arg(short, long)]
    pub exiftool: bool,

    /// Trace every step
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory searched for `@rpath/` references (repeatable, tried in order)
    #[arg(short, long, value_name = "DIR")]
    pub rpath: Vec<PathBuf>,

    /// Install prefix of the GTK runtime (detected from the executable if omitted)
    #[arg(short, long, value_name = "DIR")]
    pub prefix: Option<PathBuf>,

    /// Skip DMG creation
    #[arg(short, long, conflicts_with = "dmg_name")]
    pub no_dmg: bool,

    /// Volume and file name of the DMG (defaults to the product name)
    #[arg(short, long, value_name = "NAME")]
    pub dmg_name: Option<String>,

    /// Shell interpreter copied into the bundle to run the bootstrap scripts
    #[arg(short, long, value_name = "PATH", default_value = "/bin/sh")]
    pub shell: PathBuf,

    /// TOML file describing the application (product name, entry points, ...)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, hide = true, env = "BUNDLER_OTOOL", default_value = "otool")]
    pub otool: PathBuf,

    #[arg(long, hide = true, env = "BUNDLER_ICONUTIL", default_value = "iconutil")]
    pub iconutil: PathBuf,

    #[arg(long, hide = true, env = "BUNDLER_CC", default_value = "clang")]
    pub cc: PathBuf,

    #[arg(long, hide = true, env = "BUNDLER_HDIUTIL", default_value = "hdiutil")]
    pub hdiutil: PathBuf,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.outdir.as_os_str().is_empty() {
            return Err("Output directory cannot be empty".to_string());
        }
        if let Some(name) = &self.dmg_name {
            if name.is_empty() || name.contains('/') {
                return Err(format!("Invalid DMG name: {:?}", name));
            }
        }
        Ok(())
    }

    /// Builds validated [`Settings`] from the arguments and `config`.
    pub fn to_settings(&self, config: BundleConfig) -> crate::bundler::Result<Settings> {
        let dmg = (!self.no_dmg).then(|| DmgSettings {
            volume_name: self
                .dmg_name
                .clone()
                .unwrap_or_else(|| config.product_name.clone()),
        });

        let mut builder = SettingsBuilder::new()
            .config(config)
            .source_directory(&self.source)
            .out_directory(&self.outdir)
            .rpath(self.rpath.clone())
            .prefix(self.prefix.clone())
            .exiftool(self.exiftool)
            .shell(&self.shell)
            .tools(ToolSettings {
                otool: self.otool.clone(),
                iconutil: self.iconutil.clone(),
                cc: self.cc.clone(),
                hdiutil: self.hdiutil.clone(),
            });
        if let Some(dmg) = dmg {
            builder = builder.dmg(dmg);
        }
        builder.build()
    }
}
