//! Error types for staging operations.
//!
//! Every stage of the pipeline reports failures through [`StageError`]. No
//! error is retried; the first one aborts the run and is handed back to the
//! caller with its original diagnostic message.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Result alias used throughout the library.
pub type StageResult<T> = Result<T, StageError>;

/// Message of the configuration error raised when no filter is given.
pub const NO_FILTER: &str = "no filter provided";

/// Classification of a filesystem failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsErrorKind {
    /// The source path does not exist.
    MissingSource,
    /// The operating system refused access.
    PermissionDenied,
    /// No space left on the destination device.
    DiskFull,
    /// Anything else.
    Other,
}

impl FsErrorKind {
    /// Classify an I/O error.
    pub fn classify(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FsErrorKind::MissingSource,
            io::ErrorKind::PermissionDenied => FsErrorKind::PermissionDenied,
            _ if is_disk_full(err) => FsErrorKind::DiskFull,
            _ => FsErrorKind::Other,
        }
    }
}

impl fmt::Display for FsErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsErrorKind::MissingSource => write!(f, "missing source"),
            FsErrorKind::PermissionDenied => write!(f, "permission denied"),
            FsErrorKind::DiskFull => write!(f, "disk full"),
            FsErrorKind::Other => write!(f, "i/o error"),
        }
    }
}

#[cfg(unix)]
fn is_disk_full(err: &io::Error) -> bool {
    // ENOSPC
    err.raw_os_error() == Some(28)
}

#[cfg(windows)]
fn is_disk_full(err: &io::Error) -> bool {
    // ERROR_HANDLE_DISK_FULL, ERROR_DISK_FULL
    matches!(err.raw_os_error(), Some(39) | Some(112))
}

#[cfg(not(any(unix, windows)))]
fn is_disk_full(_err: &io::Error) -> bool {
    false
}

/// Error raised by any stage of the pipeline.
#[derive(Debug, Error)]
pub enum StageError {
    /// Invalid or missing user configuration.
    #[error("{0}")]
    Configuration(String),

    /// The package manager could not be run or exited unsuccessfully.
    #[error("`{command}` failed: {detail}")]
    ToolInvocation { command: String, detail: String },

    /// The package manager produced output we could not understand.
    #[error("unexpected output from `{command}`: {message}")]
    MetadataFormat { command: String, message: String },

    /// A copy, read or write failed.
    #[error("failed to {action} {} ({kind}): {source}", path.display())]
    Filesystem {
        kind: FsErrorKind,
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A manifest is not valid JSON or lacks the expected shape.
    #[error("invalid manifest {}: {message}", path.display())]
    ManifestFormat { path: PathBuf, message: String },
}

impl StageError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        StageError::Configuration(message.into())
    }

    /// Wrap an I/O error raised while performing `action` on `path`.
    pub fn fs(action: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        StageError::Filesystem {
            kind: FsErrorKind::classify(&source),
            action,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a manifest format error.
    pub fn manifest(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        StageError::ManifestFormat {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            StageError::Configuration(message) if message == NO_FILTER => {
                Diagnostic::error(message.clone())
                    .with_suggestion("Pass the workspace package to stage with `--filter <name>`")
            }
            StageError::Configuration(message) => Diagnostic::error(message.clone()),

            StageError::ToolInvocation { command, detail } => {
                Diagnostic::error(format!("`{}` failed", command))
                    .with_context(detail.trim().to_string())
                    .with_suggestion("Check that pnpm is installed and the target directory is inside a pnpm workspace")
                    .with_suggestion("Use `--package-manager <path>` to point at a specific pnpm binary")
            }

            StageError::MetadataFormat { command, message } => {
                Diagnostic::error(format!("could not read workspace metadata from `{}`", command))
                    .with_context(message.clone())
                    .with_suggestion("Make sure the filter names exactly one workspace package")
            }

            StageError::Filesystem {
                kind,
                action,
                path,
                source,
            } => {
                let mut diag = Diagnostic::error(format!("failed to {}", action))
                    .with_location(path)
                    .with_context(format!("{}: {}", kind, source));
                match kind {
                    FsErrorKind::MissingSource => {
                        diag = diag.with_suggestion(
                            "Run `pnpm install` so every workspace link points at an existing package",
                        );
                    }
                    FsErrorKind::PermissionDenied => {
                        diag = diag.with_suggestion("Check the permissions of the staging directory");
                    }
                    FsErrorKind::DiskFull => {
                        diag = diag.with_suggestion("Free disk space or exclude large directories with `--exclude`");
                    }
                    FsErrorKind::Other => {}
                }
                diag
            }

            StageError::ManifestFormat { path, message } => {
                Diagnostic::error("invalid package.json")
                    .with_location(path)
                    .with_context(message.clone())
            }
        }
    }
}
