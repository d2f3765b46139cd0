//! The transitive set of internal dependencies of a target package.

use std::collections::btree_map::{self, BTreeMap};
use std::path::PathBuf;

/// A workspace package reachable from the target through internal links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureMember {
    pub name: String,
    /// Absolute location of the package's source directory.
    pub source: PathBuf,
}

/// Mapping from package name to source location.
///
/// Insertion is first-wins: once a name is recorded it is never replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyClosure {
    members: BTreeMap<String, ClosureMember>,
}

impl DependencyClosure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a member. Returns `false` if the name was already present.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<PathBuf>) -> bool {
        match self.members.entry(name.into()) {
            btree_map::Entry::Occupied(_) => false,
            btree_map::Entry::Vacant(slot) => {
                let name = slot.key().clone();
                slot.insert(ClosureMember {
                    name,
                    source: source.into(),
                });
                true
            }
        }
    }

    /// Members in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ClosureMember> {
        self.members.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<'a> IntoIterator for &'a DependencyClosure {
    type Item = &'a ClosureMember;
    type IntoIter = btree_map::Values<'a, String, ClosureMember>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.values()
    }
}
