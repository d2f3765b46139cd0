//! `package.json` manifests.
//!
//! Only the three dependency lists are ever touched. Everything else in the
//! document, including key order, is carried through unchanged.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::core::closure::DependencyClosure;
use crate::core::error::{StageError, StageResult};
use crate::core::specifier::file_specifier;
use crate::core::staging::StagingDirectory;
use crate::util::fs;

/// Manifest file name inside a package directory.
pub const MANIFEST_NAME: &str = "package.json";

/// Dependency lists eligible for rewriting.
pub const DEPENDENCY_FIELDS: [&str; 3] = ["dependencies", "devDependencies", "peerDependencies"];

/// One entry replaced by a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenEntry {
    pub field: &'static str,
    pub name: String,
    pub previous: Value,
    pub specifier: String,
}

/// A parsed `package.json`.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    document: Map<String, Value>,
}

impl Manifest {
    /// Path of the manifest inside `package_dir`.
    pub fn path_in(package_dir: &Path) -> PathBuf {
        package_dir.join(MANIFEST_NAME)
    }

    /// Load the manifest of a package directory.
    pub fn load(package_dir: &Path) -> StageResult<Self> {
        let path = Self::path_in(package_dir);
        let contents = fs::read_to_string(&path)?;
        Self::parse(path, &contents)
    }

    /// Parse manifest contents read from `path`.
    pub fn parse(path: PathBuf, contents: &str) -> StageResult<Self> {
        let value: Value = serde_json::from_str(contents)
            .map_err(|e| StageError::manifest(&path, e.to_string()))?;

        let document = match value {
            Value::Object(map) => map,
            other => {
                return Err(StageError::manifest(
                    &path,
                    format!("expected a JSON object, found {}", json_kind(&other)),
                ))
            }
        };

        for field in DEPENDENCY_FIELDS {
            if let Some(list) = document.get(field) {
                if !list.is_object() {
                    return Err(StageError::manifest(
                        &path,
                        format!("`{}` must be an object, found {}", field, json_kind(list)),
                    ));
                }
            }
        }

        Ok(Manifest { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the manifest.
    pub fn package_dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    /// Package name, if declared.
    pub fn name(&self) -> Option<&str> {
        self.document.get("name").and_then(Value::as_str)
    }

    /// Look up a dependency entry.
    pub fn dependency(&self, field: &str, name: &str) -> Option<&Value> {
        self.document.get(field)?.as_object()?.get(name)
    }

    /// Point every entry naming a closure member at its staged copy.
    ///
    /// Matching entries are replaced unconditionally with a `file:` reference
    /// relative to this manifest's directory; other entries are untouched.
    pub fn redirect_to_staging(
        &mut self,
        staging: &StagingDirectory,
        closure: &DependencyClosure,
    ) -> Vec<RewrittenEntry> {
        let package_dir = self.package_dir().to_path_buf();
        let mut rewritten = Vec::new();

        for field in DEPENDENCY_FIELDS {
            let Some(list) = self.document.get_mut(field).and_then(Value::as_object_mut) else {
                continue;
            };

            for member in closure {
                let Some(entry) = list.get_mut(&member.name) else {
                    continue;
                };

                let relative = fs::relative_path(&package_dir, &staging.member_path(&member.name));
                let specifier = file_specifier(&relative);
                let previous = std::mem::replace(entry, Value::String(specifier.clone()));

                rewritten.push(RewrittenEntry {
                    field,
                    name: member.name.clone(),
                    previous,
                    specifier,
                });
            }
        }

        rewritten
    }

    /// Serialize with two-space indentation and a trailing newline.
    pub fn to_json_string(&self) -> StageResult<String> {
        let mut out = serde_json::to_string_pretty(&self.document)
            .map_err(|e| StageError::manifest(&self.path, e.to_string()))?;
        out.push('\n');
        Ok(out)
    }

    /// Write the manifest back to disk.
    pub fn save(&self) -> StageResult<()> {
        fs::write_string(&self.path, &self.to_json_string()?)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
