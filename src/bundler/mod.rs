//! Core bundling engine.
//!
//! Turns a built GTK application tree into a self-contained macOS `.app`:
//! dylib closure, runtime assets, launcher shims and an optional DMG.
//!
//! # Module Organization
//!
//! - [`builder`] - the [`Bundler`] orchestrator and external tool helpers
//! - [`platform`] - macOS-specific steps (dylib scan, resources, launchers, dmg)
//! - [`settings`] - [`Settings`] and the [`SettingsBuilder`]
//! - [`utils`] - filesystem helpers

pub mod builder;
pub mod error;
pub mod platform;
pub mod settings;
pub mod utils;

use std::path::PathBuf;

pub use builder::Bundler;
pub use error::{Error, Result, Warning};
pub use settings::{
    BundleConfig, DmgSettings, EntryPoint, EntryPointKind, Settings, SettingsBuilder,
    ToolSettings,
};

/// A packaged artifact produced by a run.
#[derive(Debug, Clone)]
pub struct BundledArtifact {
    /// Path to the created file.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256 of the file.
    pub checksum: String,
}

/// Outcome of a completed bundling run.
#[derive(Debug, Default)]
pub struct BundleReport {
    /// The `.app` directory that was assembled.
    pub app_dir: PathBuf,
    /// Libraries copied into `Contents/Frameworks`.
    pub libraries: Vec<PathBuf>,
    /// Every recoverable problem, in the order it was recorded.
    pub warnings: Vec<Warning>,
    /// The disk image, when packaging was requested.
    pub artifact: Option<BundledArtifact>,
}
