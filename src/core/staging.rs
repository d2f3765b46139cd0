//! The staging directory that receives copies of closure members.

use std::path::{Component, Path, PathBuf};

use crate::core::error::{StageError, StageResult};
use crate::core::manifest::MANIFEST_NAME;
use crate::util::fs;

/// Default staging directory name, relative to the target package.
pub const DEFAULT_STAGING_DIR: &str = ".firebase-pnpm-workspaces";

/// A staging directory scoped to a target package.
///
/// Holds one subdirectory per closure member, named after the package.
/// It is the deliverable of a run and is never cleaned up afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingDirectory {
    root: PathBuf,
}

impl StagingDirectory {
    /// Locate the staging directory `name` inside `target_dir`.
    ///
    /// `name` must be a non-empty relative path without `..` components.
    pub fn for_target(target_dir: &Path, name: &str) -> StageResult<Self> {
        Self::check_name(name)?;
        Ok(StagingDirectory {
            root: target_dir.join(name),
        })
    }

    /// Check that `name` is usable as a staging directory name.
    pub fn check_name(name: &str) -> StageResult<()> {
        validate_name(name)
    }

    /// Absolute path of the staging directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Where the copy of package `name` lives.
    pub fn member_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Create the directory if absent.
    pub fn ensure(&self) -> StageResult<()> {
        fs::ensure_dir(&self.root)
    }

    /// Remove the directory and everything staged in it.
    ///
    /// Refuses to touch a directory that holds anything other than staged
    /// packages, so a mistyped name cannot wipe part of the target.
    pub fn clear(&self) -> StageResult<()> {
        if !self.holds_only_packages()? {
            return Err(StageError::config(format!(
                "refusing to clean {}: it contains files that were not staged by pnpm-stage",
                self.root.display()
            )));
        }
        fs::remove_dir_all_if_exists(&self.root)
    }

    /// Whether every entry is a package directory (`<name>/package.json`
    /// or `@scope/<name>/package.json`). A missing directory counts as empty.
    fn holds_only_packages(&self) -> StageResult<bool> {
        if !self.root.exists() {
            return Ok(true);
        }
        for entry in read_dir(&self.root)? {
            let is_scope = entry
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with('@'));
            if is_scope && entry.is_dir() {
                if !read_dir(&entry)?.iter().all(|pkg| is_package_dir(pkg)) {
                    return Ok(false);
                }
            } else if !is_package_dir(&entry) {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn read_dir(dir: &Path) -> StageResult<Vec<PathBuf>> {
    std::fs::read_dir(dir)
        .and_then(|entries| entries.map(|e| e.map(|e| e.path())).collect())
        .map_err(|e| StageError::fs("read", dir, e))
}

fn is_package_dir(path: &Path) -> bool {
    path.is_dir() && path.join(MANIFEST_NAME).is_file()
}

fn validate_name(name: &str) -> StageResult<()> {
    let path = Path::new(name);
    if name.trim().is_empty() {
        return Err(StageError::config("staging directory name must not be empty"));
    }
    if path.is_absolute() || path.has_root() {
        return Err(StageError::config(format!(
            "staging directory `{}` must be relative to the target package",
            name
        )));
    }
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
    {
        return Err(StageError::config(format!(
            "staging directory `{}` must stay inside the target package",
            name
        )));
    }
    if path.components().all(|c| matches!(c, Component::CurDir)) {
        return Err(StageError::config(
            "staging directory must not be the target package itself",
        ));
    }
    Ok(())
}
