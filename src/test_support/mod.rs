//! Test utilities and mocks for unit tests.
//!
//! [`MockQuery`] stands in for the package manager and [`WorkspaceFixture`]
//! lays out a small monorepo on disk that the mock describes.
//!
//! # Example
//!
//! ```rust,ignore
//! use pnpm_stage::test_support::WorkspaceFixture;
//!
//! #[test]
//! fn test_example() {
//!     let mut ws = WorkspaceFixture::new();
//!     ws.add_package("lib-a", &[], &[]);
//!     let app = ws.add_package("app", &["lib-a"], &[]);
//!
//!     let resolution = pnpm_stage::resolver::resolve(ws.query(), "app").unwrap();
//!     // ...
//! }
//! ```

pub mod fixtures;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::core::error::{StageError, StageResult};
use crate::core::package::WorkspacePackage;
use crate::query::WorkspaceQuery;

pub use fixtures::*;

/// In-memory package manager.
///
/// Answers queries by exact package name and records every filter it
/// receives, in order.
#[derive(Debug, Default)]
pub struct MockQuery {
    packages: HashMap<String, WorkspacePackage>,
    failures: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package, answered when queried by its name.
    pub fn with_package(mut self, pkg: WorkspacePackage) -> Self {
        self.add_package(pkg);
        self
    }

    pub fn add_package(&mut self, pkg: WorkspacePackage) {
        self.packages.insert(pkg.name.clone(), pkg);
    }

    /// Make queries for `filter` fail as if the tool exited non-zero.
    pub fn with_failure(mut self, filter: &str, stderr: &str) -> Self {
        self.failures.insert(filter.to_string(), stderr.to_string());
        self
    }

    /// Filters queried so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl WorkspaceQuery for MockQuery {
    fn query(&self, filter: &str) -> StageResult<WorkspacePackage> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(filter.to_string());
        }

        let command = format!("pnpm ls --filter={} --depth 0 --json", filter);

        if let Some(stderr) = self.failures.get(filter) {
            return Err(StageError::ToolInvocation {
                command,
                detail: format!("exit code 1\n{}", stderr),
            });
        }

        self.packages
            .get(filter)
            .cloned()
            .ok_or_else(|| StageError::MetadataFormat {
                command,
                message: "no workspace package matches the filter".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_query_records_calls() {
        let query = MockQuery::new()
            .with_package(WorkspacePackage::new("app", "/ws/app"))
            .with_failure("broken", "ERR_PNPM_BROKEN");

        assert_eq!(query.query("app").unwrap().name, "app");
        assert!(matches!(
            query.query("missing"),
            Err(StageError::MetadataFormat { .. })
        ));
        assert!(matches!(
            query.query("broken"),
            Err(StageError::ToolInvocation { .. })
        ));
        assert_eq!(query.calls(), vec!["app", "missing", "broken"]);
    }
}
