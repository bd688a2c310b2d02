//! macOS `.app` bundle construction.
//!
//! - [`dylib`] - transitive dylib closure and Frameworks population
//! - [`prefix`] - runtime install prefix discovery
//! - [`resources`] - auxiliary asset manifest
//! - [`launcher`] - native shims and bootstrap scripts
//! - [`info_plist`] - Info.plist generation
//! - [`icon`] - `.icns` generation
//! - [`dmg`] - disk image packaging

pub mod dmg;
pub mod dylib;
pub mod icon;
pub mod info_plist;
pub mod launcher;
pub mod prefix;
pub mod resources;
