//! macOS application bundler for GTK programs.
//!
//! Turns an application build tree into a self-contained `.app`:
//! - transitive dylib closure copied into `Contents/Frameworks`
//! - GTK runtime assets (loaders, input methods, icons, schemas, D-Bus)
//! - native launcher shims with environment bootstrap scripts
//! - Info.plist, `.icns` icon and an optional compressed DMG
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
