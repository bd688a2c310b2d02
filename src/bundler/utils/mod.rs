//! Shared helpers for bundling steps.

pub mod fs;
