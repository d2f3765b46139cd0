//! Dependency version specifiers as reported by the package manager.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

/// Prefix marking a workspace link in `pnpm ls` output.
pub const LINK_PREFIX: &str = "link:";

/// Prefix of a local-file reference written into rewritten manifests.
pub const FILE_PREFIX: &str = "file:";

/// A declared dependency specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specifier {
    /// Another workspace package, linked by path relative to the declaring package.
    Link(PathBuf),
    /// Anything resolved outside the workspace (registry version, tarball, git).
    External(String),
}

impl Specifier {
    /// Parse a specifier string.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(LINK_PREFIX) {
            Some(offset) => Specifier::Link(PathBuf::from(offset)),
            None => Specifier::External(raw.to_string()),
        }
    }

    /// Whether this specifier denotes an internal workspace link.
    pub fn is_internal_link(&self) -> bool {
        matches!(self, Specifier::Link(_))
    }

    /// The relative path offset of a workspace link.
    pub fn link_offset(&self) -> Option<&Path> {
        match self {
            Specifier::Link(offset) => Some(offset),
            Specifier::External(_) => None,
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specifier::Link(offset) => write!(f, "{}{}", LINK_PREFIX, offset.display()),
            Specifier::External(raw) => write!(f, "{}", raw),
        }
    }
}

impl<'de> Deserialize<'de> for Specifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Specifier::parse(&raw))
    }
}

/// Build a `file:` specifier from a relative path, always using `/` separators.
pub fn file_specifier(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("{}{}", FILE_PREFIX, parts.join("/"))
}
