//! Transitive closure of internal workspace links.

use std::collections::HashSet;

use crate::core::closure::DependencyClosure;
use crate::core::error::StageResult;
use crate::core::package::WorkspacePackage;
use crate::query::WorkspaceQuery;
use crate::resolver::graph::LinkGraph;
use crate::util::fs::normalize_path;

/// Outcome of resolving a target package.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The target package as reported by the package manager.
    pub root: WorkspacePackage,
    /// Every workspace package the target reaches through links.
    pub closure: DependencyClosure,
    /// Link edges between the target and closure members.
    pub graph: LinkGraph,
    /// Number of package manager queries issued.
    pub queries: usize,
}

/// Expands internal links depth-first, one query per package.
///
/// The visited set is seeded with the target's own name and every name is
/// inserted before its package is queried, so each package is queried at
/// most once and dependency cycles terminate.
pub struct DependencyGraphResolver<'q, Q: WorkspaceQuery + ?Sized> {
    query: &'q Q,
    visited: HashSet<String>,
    closure: DependencyClosure,
    graph: LinkGraph,
    queries: usize,
}

impl<'q, Q: WorkspaceQuery + ?Sized> DependencyGraphResolver<'q, Q> {
    pub fn new(query: &'q Q) -> Self {
        DependencyGraphResolver {
            query,
            visited: HashSet::new(),
            closure: DependencyClosure::new(),
            graph: LinkGraph::new(),
            queries: 0,
        }
    }

    /// Resolve the closure of the package selected by `filter`.
    pub fn resolve(mut self, filter: &str) -> StageResult<Resolution> {
        let root = self.fetch(filter)?;
        self.visited.insert(root.name.clone());
        self.expand(&root)?;

        tracing::debug!(
            "resolved {} internal dependencies of `{}` with {} queries",
            self.closure.len(),
            root.name,
            self.queries
        );

        Ok(Resolution {
            root,
            closure: self.closure,
            graph: self.graph,
            queries: self.queries,
        })
    }

    fn fetch(&mut self, filter: &str) -> StageResult<WorkspacePackage> {
        self.queries += 1;
        let pkg = self.query.query(filter)?;

        for conflict in pkg.specifier_conflicts() {
            tracing::warn!(
                "`{}` declares `{}` as `{}` in dependencies and `{}` in devDependencies; using `{}`",
                pkg.name,
                conflict.name,
                conflict.normal,
                conflict.development,
                conflict.development
            );
        }

        Ok(pkg)
    }

    fn expand(&mut self, pkg: &WorkspacePackage) -> StageResult<()> {
        for link in pkg.internal_links() {
            self.graph.add_edge(&pkg.name, link.name);

            if !self.visited.insert(link.name.to_string()) {
                tracing::trace!("`{}` already visited", link.name);
                continue;
            }

            let source = normalize_path(&pkg.path, link.offset);
            tracing::debug!("`{}` -> `{}` at {}", pkg.name, link.name, source.display());
            self.closure.insert(link.name, source);

            let dep = self.fetch(link.name)?;
            self.expand(&dep)?;
        }
        Ok(())
    }
}

/// Resolve the closure of the package selected by `filter`.
pub fn resolve<Q: WorkspaceQuery + ?Sized>(query: &Q, filter: &str) -> StageResult<Resolution> {
    DependencyGraphResolver::new(query).resolve(filter)
}
