//! Workspace metadata queries.
//!
//! The package manager is the only authority on where workspace packages
//! live and how they link to each other. [`WorkspaceQuery`] is the seam
//! between the resolver and that external tool.

mod pnpm;

pub use pnpm::{parse_listing, PnpmQuery, DEFAULT_PACKAGE_MANAGER};

use crate::core::error::StageResult;
use crate::core::package::WorkspacePackage;

/// Looks up one workspace package by filter.
pub trait WorkspaceQuery {
    /// Return the first package matching `filter`, with its direct
    /// dependencies only.
    fn query(&self, filter: &str) -> StageResult<WorkspacePackage>;
}

impl<Q: WorkspaceQuery + ?Sized> WorkspaceQuery for &Q {
    fn query(&self, filter: &str) -> StageResult<WorkspacePackage> {
        (**self).query(filter)
    }
}
