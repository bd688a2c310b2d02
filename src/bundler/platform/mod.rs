//! Platform-specific bundling steps.

pub mod macos;
