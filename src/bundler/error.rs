//! Error and warning types for bundling operations.
//!
//! Fatal conditions are variants of [`Error`] and abort the run. Recoverable
//! conditions are [`Warning`]s: they are logged and accumulated, never returned
//! as `Err`.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Result type alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal bundler errors.
#[derive(ThisError, Debug)]
pub enum Error {
    /// The application build tree does not contain the root executable.
    #[error(
        "{} not found! Please run from the build directory of the application",
        .path.display()
    )]
    MissingSourceTree {
        /// Expected location of the root executable
        path: PathBuf,
    },

    /// The dependency probe could not be run or reported failure.
    #[error("dependency probe failed for {path}: {reason}")]
    ProbeFailure {
        /// File being probed
        path: String,
        /// Reason reported by the probe
        reason: String,
    },

    /// No dependency of the root executable names the marker library.
    #[error("can't determine install prefix: no dependency matches {marker}")]
    PrefixNotFound {
        /// Marker library name searched for
        marker: String,
    },

    /// A mandatory external tool is missing or exited with failure.
    #[error("{tool} failed: {reason}")]
    ToolInvocationFailure {
        /// Tool program name
        tool: String,
        /// Reason for the failure
        reason: String,
    },

    /// The bundle output directory is already present.
    #[error("destination {} already exists", .0.display())]
    DestinationExists(PathBuf),

    /// Filesystem operation failed on a specific path.
    #[error("{context} {}: {source}", .path.display())]
    Fs {
        /// What was being done
        context: String,
        /// Path involved
        path: PathBuf,
        /// Underlying IO error
        source: io::Error,
    },

    /// IO errors
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Info.plist serialization errors
    #[error("plist error: {0}")]
    Plist(#[from] plist::Error),

    /// Template rendering errors
    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// Bundle configuration errors
    #[error("invalid bundle configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Directory traversal errors
    #[error("directory walk failed: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Catch-all error with a message.
    #[error("{0}")]
    GenericError(String),
}

/// Recoverable problems recorded during a run.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A resolved library could not be copied into Frameworks.
    #[error("{library} not found, skipping ({reason})")]
    LibraryCopy {
        /// Library path as reported by the scanner
        library: String,
        /// Why the copy failed
        reason: String,
    },

    /// A manifest entry could not be copied into the bundle.
    #[error("SKIPPING {}: {reason}", .path.display())]
    ResourceCopy {
        /// Entry source path
        path: PathBuf,
        /// Why the entry was skipped
        reason: String,
    },
}

/// Adds a message to errors and turns `None` into an error.
pub trait Context<T> {
    /// Wrap the error (or absence) with a static message.
    fn context<C: Display + Send + Sync + 'static>(self, context: C) -> Result<T>;

    /// Wrap the error (or absence) with a lazily built message.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: Display> Context<T> for std::result::Result<T, E> {
    fn context<C: Display + Send + Sync + 'static>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::GenericError(format!("{}: {e}", f())))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display + Send + Sync + 'static>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Attaches the offending path to IO failures.
pub trait ErrorExt<T> {
    /// Convert an IO error into [`Error::Fs`] naming `path`.
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for io::Result<T> {
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::Fs {
            context: context.to_string(),
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Return early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)))
    };
}
