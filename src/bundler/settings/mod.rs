//! Configuration structures for bundling operations.
//!
//! [`BundleConfig`] describes the application (optionally loaded from TOML),
//! [`Settings`] adds everything that varies per run, and [`SettingsBuilder`]
//! assembles the two.

mod builder;
mod bundle;
mod core;
mod macos;

// Re-export all public types
pub use builder::SettingsBuilder;
pub use bundle::{BundleConfig, EntryPoint, EntryPointKind};
pub use self::core::Settings;
pub use macos::{DmgSettings, ToolSettings};
