//! Internal dependency resolution.
//!
//! Expands the transitive closure of workspace links starting from a target
//! package. The package manager is queried once per package, sequentially,
//! since each query decides what to ask next.

pub mod graph;
pub mod resolve;

pub use graph::LinkGraph;
pub use resolve::{resolve, DependencyGraphResolver, Resolution};
