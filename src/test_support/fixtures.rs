//! On-disk workspace fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use tempfile::TempDir;

use crate::core::package::{DependencyKind, WorkspacePackage};
use crate::test_support::MockQuery;
use crate::util::fs::relative_path;

/// A throwaway pnpm-style monorepo.
///
/// Every package lives at `packages/<name>` and gets a `package.json`
/// declaring its workspace links as `workspace:*` plus one registry
/// dependency, and a `src/index.js`. The matching listing entries are
/// registered with an internal [`MockQuery`].
pub struct WorkspaceFixture {
    root: TempDir,
    query: MockQuery,
}

impl WorkspaceFixture {
    pub fn new() -> Self {
        WorkspaceFixture {
            root: TempDir::new().expect("failed to create temp dir"),
            query: MockQuery::new(),
        }
    }

    /// Directory of package `name`.
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.root.path().join("packages").join(name)
    }

    /// The mock answering queries about this workspace.
    pub fn query(&self) -> &MockQuery {
        &self.query
    }

    /// Create package `name` linking to `deps` and `dev_deps`.
    ///
    /// Linked packages do not need to exist yet.
    pub fn add_package(&mut self, name: &str, deps: &[&str], dev_deps: &[&str]) -> PathBuf {
        let dir = self.package_dir(name);
        fs::create_dir_all(dir.join("src")).expect("failed to create package dir");
        fs::write(
            dir.join("src/index.js"),
            format!("module.exports = {:?};\n", name),
        )
        .expect("failed to write source");

        let mut dependencies = Map::new();
        dependencies.insert("left-pad".to_string(), json!("^1.3.0"));
        for dep in deps {
            dependencies.insert(dep.to_string(), json!("workspace:*"));
        }
        let mut dev_dependencies = Map::new();
        for dep in dev_deps {
            dev_dependencies.insert(dep.to_string(), json!("workspace:*"));
        }

        let mut manifest = Map::new();
        manifest.insert("name".to_string(), json!(name));
        manifest.insert("version".to_string(), json!("1.0.0"));
        manifest.insert("main".to_string(), json!("src/index.js"));
        manifest.insert("dependencies".to_string(), Value::Object(dependencies));
        if !dev_dependencies.is_empty() {
            manifest.insert("devDependencies".to_string(), Value::Object(dev_dependencies));
        }
        self.write_manifest(name, &Value::Object(manifest));

        let mut pkg = WorkspacePackage::new(name, &dir)
            .with_dependency(DependencyKind::Normal, "left-pad", "1.3.0");
        for dep in deps {
            pkg = pkg.with_dependency(DependencyKind::Normal, *dep, &self.link_to(&dir, dep));
        }
        for dep in dev_deps {
            pkg = pkg.with_dependency(DependencyKind::Development, *dep, &self.link_to(&dir, dep));
        }
        self.query.add_package(pkg);

        dir
    }

    /// Overwrite the manifest of package `name`.
    pub fn write_manifest(&self, name: &str, manifest: &Value) {
        let path = self.package_dir(name).join("package.json");
        let mut contents = serde_json::to_string_pretty(manifest).expect("failed to serialize");
        contents.push('\n');
        fs::write(path, contents).expect("failed to write package.json");
    }

    /// Read back the manifest at `dir/package.json`.
    pub fn read_manifest(dir: &Path) -> Value {
        let contents = fs::read_to_string(dir.join("package.json")).expect("failed to read package.json");
        serde_json::from_str(&contents).expect("invalid package.json")
    }

    fn link_to(&self, from: &Path, dep: &str) -> String {
        let rel = relative_path(from, &self.package_dir(dep));
        format!("link:{}", rel.display())
    }
}

impl Default for WorkspaceFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::WorkspaceQuery;

    #[test]
    fn test_fixture_layout() {
        let mut ws = WorkspaceFixture::new();
        let dir = ws.add_package("app", &["lib-a"], &["tooling"]);

        assert!(dir.join("src/index.js").exists());
        let manifest = WorkspaceFixture::read_manifest(&dir);
        assert_eq!(manifest["dependencies"]["lib-a"], "workspace:*");
        assert_eq!(manifest["devDependencies"]["tooling"], "workspace:*");

        let pkg = ws.query().query("app").unwrap();
        let offsets: Vec<_> = pkg
            .internal_links()
            .iter()
            .map(|l| l.offset.to_path_buf())
            .collect();
        assert_eq!(offsets, vec![PathBuf::from("../lib-a"), PathBuf::from("../tooling")]);
    }
}
