//! Workspace package metadata.
//!
//! A [`WorkspacePackage`] is one entry of the package manager's listing: the
//! package's name, its on-disk location and its direct dependencies. It is
//! produced fresh by every query and never cached.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::specifier::Specifier;

/// Which dependency list an entry was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Normal,
    Development,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Normal => write!(f, "dependencies"),
            DependencyKind::Development => write!(f, "devDependencies"),
        }
    }
}

/// A single dependency entry from the listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DependencyInfo {
    /// The declared specifier (`version` in `pnpm ls` output).
    #[serde(rename = "version")]
    pub specifier: Specifier,
}

impl DependencyInfo {
    pub fn new(specifier: Specifier) -> Self {
        DependencyInfo { specifier }
    }

    /// Whether this entry is another workspace package.
    pub fn is_internal_link(&self) -> bool {
        self.specifier.is_internal_link()
    }
}

/// One package of the monorepo.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkspacePackage {
    /// Unique package name within the workspace.
    pub name: String,

    /// Absolute location of the package directory.
    pub path: PathBuf,

    #[serde(default)]
    pub dependencies: BTreeMap<String, DependencyInfo>,

    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, DependencyInfo>,
}

/// A dependency declared in both lists with different specifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecifierConflict {
    pub name: String,
    pub normal: Specifier,
    pub development: Specifier,
}

/// An internal-link edge out of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalLink<'a> {
    pub name: &'a str,
    pub offset: &'a Path,
    pub kind: DependencyKind,
}

impl WorkspacePackage {
    /// Create a package with no dependencies.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        WorkspacePackage {
            name: name.into(),
            path: path.into(),
            dependencies: BTreeMap::new(),
            dev_dependencies: BTreeMap::new(),
        }
    }

    /// Add a dependency of the given kind.
    pub fn with_dependency(
        mut self,
        kind: DependencyKind,
        name: impl Into<String>,
        specifier: &str,
    ) -> Self {
        let info = DependencyInfo::new(Specifier::parse(specifier));
        match kind {
            DependencyKind::Normal => self.dependencies.insert(name.into(), info),
            DependencyKind::Development => self.dev_dependencies.insert(name.into(), info),
        };
        self
    }

    /// Merge `dependencies` and `devDependencies`; on a shared name the
    /// `devDependencies` entry wins.
    pub fn all_dependencies(&self) -> BTreeMap<&str, (DependencyKind, &DependencyInfo)> {
        let mut merged = BTreeMap::new();
        for (name, info) in &self.dependencies {
            merged.insert(name.as_str(), (DependencyKind::Normal, info));
        }
        for (name, info) in &self.dev_dependencies {
            merged.insert(name.as_str(), (DependencyKind::Development, info));
        }
        merged
    }

    /// Internal-link edges of the merged dependency set.
    pub fn internal_links(&self) -> Vec<InternalLink<'_>> {
        self.all_dependencies()
            .into_iter()
            .filter_map(|(name, (kind, info))| {
                info.specifier.link_offset().map(|offset| InternalLink {
                    name,
                    offset,
                    kind,
                })
            })
            .collect()
    }

    /// Names declared in both lists with differing specifiers.
    pub fn specifier_conflicts(&self) -> Vec<SpecifierConflict> {
        self.dependencies
            .iter()
            .filter_map(|(name, normal)| {
                let dev = self.dev_dependencies.get(name)?;
                if dev.specifier == normal.specifier {
                    return None;
                }
                Some(SpecifierConflict {
                    name: name.clone(),
                    normal: normal.specifier.clone(),
                    development: dev.specifier.clone(),
                })
            })
            .collect()
    }
}
