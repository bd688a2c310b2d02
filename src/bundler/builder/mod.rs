//! Bundle orchestration and coordination.
//!
//! This module provides the main [`Bundler`] orchestrator that runs the
//! bundling steps in order and collects their results.
//!
//! # Example
//!
//! ```no_run
//! use art_bundler::bundler::{Bundler, SettingsBuilder};
//!
//! # async fn example() -> art_bundler::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .source_directory("build")
//!     .out_directory("dist")
//!     .build()?;
//!
//! let report = Bundler::new(settings).bundle().await?;
//! for warning in &report.warnings {
//!     println!("{}", warning);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`command`] - external tool invocation
//! - `orchestrator` - the [`Bundler`] itself
//! - [`tool_detection`] - external tool availability checking

pub mod checksum;
pub mod command;
mod orchestrator;
pub mod tool_detection;

pub use orchestrator::Bundler;
