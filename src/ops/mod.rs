//! High-level operations.
//!
//! This module contains the staging pipeline and its two filesystem stages.

pub mod materialize;
pub mod rewrite;
pub mod stage;

pub use materialize::materialize;
pub use rewrite::{rewrite_all, rewrite_manifest, RewriteSummary};
pub use stage::{plan, stage, PlannedCopy, StageListener, StageOptions, StagePlan, StageReport};
