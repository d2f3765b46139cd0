//! Core data structures.
//!
//! - Workspace packages and their dependency specifiers
//! - The dependency closure and the staging directory it is copied into
//! - `package.json` manifests
//! - The error taxonomy shared by every stage

pub mod closure;
pub mod error;
pub mod manifest;
pub mod package;
pub mod specifier;
pub mod staging;

pub use closure::{ClosureMember, DependencyClosure};
pub use error::{FsErrorKind, StageError, StageResult};
pub use manifest::{Manifest, MANIFEST_NAME};
pub use package::{DependencyInfo, DependencyKind, WorkspacePackage};
pub use specifier::Specifier;
pub use staging::{StagingDirectory, DEFAULT_STAGING_DIR};
