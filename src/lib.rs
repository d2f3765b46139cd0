//! pnpm-stage - stage a pnpm workspace package for deployment
//!
//! Given a target package inside a pnpm workspace, this crate finds every
//! workspace package it transitively links to, copies those packages into
//! a staging directory inside the target, and rewrites `package.json` files
//! so the links become relative `file:` references.

pub mod core;
pub mod ops;
pub mod query;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides an in-memory package manager and on-disk
/// workspace fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    closure::DependencyClosure, error::StageError, manifest::Manifest,
    package::WorkspacePackage, staging::StagingDirectory,
};

pub use ops::{stage, StageOptions, StageReport};
pub use query::{PnpmQuery, WorkspaceQuery};
pub use resolver::Resolution;
pub use util::context::GlobalContext;
